use crate::common::{as_human_readable, as_unix_nano};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::SystemTime;
use tracebridge::trace::{SpanId, SpanKind, Status};
use tracebridge::{Key, Value};

/// One exported span in the shape written to the output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    trace_id: String,
    span_id: String,
    trace_flags: String,
    parent_span_id: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    parent_span_is_remote: bool,
    name: Cow<'static, str>,
    kind: SpanKind,
    scope: Cow<'static, str>,
    service_name: Cow<'static, str>,
    #[serde(serialize_with = "as_unix_nano")]
    start_time_unix_nano: SystemTime,
    #[serde(serialize_with = "as_human_readable")]
    start_time: SystemTime,
    #[serde(serialize_with = "as_unix_nano")]
    end_time_unix_nano: SystemTime,
    #[serde(serialize_with = "as_human_readable")]
    end_time: SystemTime,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<Key, Value>,
    status: Status,
}

impl From<tracebridge_sdk::trace::SpanData> for SpanRecord {
    fn from(value: tracebridge_sdk::trace::SpanData) -> Self {
        SpanRecord {
            trace_id: value.span_context.trace_id().to_string(),
            span_id: value.span_context.span_id().to_string(),
            trace_flags: format!("{:02x}", value.span_context.trace_flags()),
            parent_span_id: Some(value.parent_span_id)
                .filter(|id| *id != SpanId::INVALID)
                .map(|id| id.to_string())
                .unwrap_or_default(),
            parent_span_is_remote: value.parent_span_is_remote,
            name: value.name,
            kind: value.span_kind,
            scope: value.scope_name,
            service_name: value.service_name,
            start_time_unix_nano: value.start_time,
            start_time: value.start_time,
            end_time_unix_nano: value.end_time,
            end_time: value.end_time,
            tags: value
                .tags
                .into_iter()
                .map(|kv| (kv.key, kv.value))
                .collect(),
            status: value.status,
        }
    }
}
