//! Trace exporters
use crate::trace::TraceResult;
use futures_util::future::BoxFuture;
use std::borrow::Cow;
use std::fmt::Debug;
use std::time::SystemTime;
use tracebridge::trace::{SpanContext, SpanId, SpanKind, Status};
use tracebridge::KeyValue;

/// Describes the result of an export.
pub type ExportResult = TraceResult<()>;

/// Trait for errors returned by exporters
pub trait ExportError: std::error::Error + Send + Sync + 'static {
    /// The name of exporter that returned this error
    fn exporter_name(&self) -> &'static str;
}

/// `SpanExporter` defines the interface that protocol-specific exporters must
/// implement so that they can be plugged into the SDK and support sending of
/// telemetry data.
///
/// The goal of the interface is to minimize burden of implementation for
/// protocol-dependent telemetry exporters. The protocol exporter is expected to
/// be primarily a simple telemetry data encoder and transmitter.
pub trait SpanExporter: Send + Sync + Debug {
    /// Exports a batch of ended spans.
    ///
    /// This function will never be called concurrently for the same exporter
    /// instance. It can be called again only after the current call returns.
    ///
    /// Any retry logic that is required by the exporter is the responsibility
    /// of the exporter.
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult>;

    /// Shuts down the exporter. Called when SDK is shut down. After the call
    /// to `shutdown`, subsequent calls to `export` should return an error.
    fn shutdown(&mut self) {}

    /// Ensure that the export of any spans the exporter has received prior to
    /// this call is completed as soon as possible.
    fn force_flush(&mut self) -> BoxFuture<'static, ExportResult> {
        Box::pin(async { Ok(()) })
    }
}

/// Immutable snapshot of an ended span, as handed to processors and exporters.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanData {
    /// Exportable `SpanContext`
    pub span_context: SpanContext,
    /// Span parent id, [`SpanId::INVALID`] for root spans
    pub parent_span_id: SpanId,
    /// Whether the parent context was restored from a received message
    pub parent_span_is_remote: bool,
    /// Span kind
    pub span_kind: SpanKind,
    /// Span name
    pub name: Cow<'static, str>,
    /// Span start time
    pub start_time: SystemTime,
    /// Span end time
    pub end_time: SystemTime,
    /// Span tags, sorted by key
    pub tags: Vec<KeyValue>,
    /// Span status
    pub status: Status,
    /// Name of the tracer that started the span
    pub scope_name: Cow<'static, str>,
    /// Name of the service that produced the span
    pub service_name: Cow<'static, str>,
}

impl SpanData {
    /// Looks up a tag by key.
    pub fn tag(&self, key: &str) -> Option<&tracebridge::Value> {
        self.tags
            .iter()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| &kv.value)
    }
}
