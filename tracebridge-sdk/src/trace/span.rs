//! # Span
//!
//! `Span`s represent a single operation within a trace. A span is open from
//! the moment a [`Tracer`](crate::trace::Tracer) starts it until it is ended,
//! and then it is frozen: tags and status no longer change and the finished
//! [`SpanData`] is handed once to the provider's span processors.
//!
//! A span that is dropped without being ended is discarded: it is marked
//! ended but never reaches a processor.
//!
//! The start time is read from the wall clock. The end time is the start time
//! plus the monotonic time elapsed since the start, so it never precedes the
//! start time even if the wall clock jumps.
use crate::trace::{SpanData, Tracer};
use std::borrow::Cow;
use std::time::{Duration, Instant, SystemTime};
use tracebridge::trace::{SpanContext, SpanKind, Status};
use tracebridge::{Key, KeyValue, Value};

/// Single operation within a trace.
#[derive(Debug)]
pub struct Span {
    span_context: SpanContext,
    parent: Option<SpanContext>,
    name: Cow<'static, str>,
    kind: SpanKind,
    tags: Vec<KeyValue>,
    status: Status,
    start_time: SystemTime,
    start_instant: Instant,
    end_time: Option<SystemTime>,
    tracer: Tracer,
}

impl Span {
    pub(crate) fn new(
        span_context: SpanContext,
        parent: Option<SpanContext>,
        name: Cow<'static, str>,
        kind: SpanKind,
        tracer: Tracer,
    ) -> Self {
        Span {
            span_context,
            parent,
            name,
            kind,
            tags: Vec::new(),
            status: Status::Unset,
            start_time: SystemTime::now(),
            start_instant: Instant::now(),
            end_time: None,
            tracer,
        }
    }

    /// Returns the `SpanContext` of this span.
    pub fn context(&self) -> &SpanContext {
        &self.span_context
    }

    /// Context of the parent span, `None` for a root span.
    pub fn parent_context(&self) -> Option<&SpanContext> {
        self.parent.as_ref()
    }

    /// Span name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Span kind
    pub fn kind(&self) -> &SpanKind {
        &self.kind
    }

    /// Tags in the order they were first set.
    pub fn tags(&self) -> &[KeyValue] {
        &self.tags
    }

    /// Looks up a tag by key.
    pub fn tag(&self, key: &str) -> Option<&Value> {
        self.tags
            .iter()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| &kv.value)
    }

    /// Current status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Wall-clock start time.
    pub fn start_time(&self) -> SystemTime {
        self.start_time
    }

    /// End time, `None` while the span is open.
    pub fn end_time(&self) -> Option<SystemTime> {
        self.end_time
    }

    /// Time between start and end, `None` while the span is open.
    pub fn duration(&self) -> Option<Duration> {
        self.end_time
            .and_then(|end| end.duration_since(self.start_time).ok())
    }

    /// Returns `true` once [`end`](Span::end) has been called.
    pub fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }

    /// Sets a tag. Setting the same key again replaces the value.
    ///
    /// Does nothing once the span has ended.
    pub fn set_tag(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        if self.is_ended() {
            return;
        }
        let key = key.into();
        let value = value.into();
        match self.tags.iter_mut().find(|kv| kv.key == key) {
            Some(existing) => existing.value = value,
            None => self.tags.push(KeyValue::new(key, value)),
        }
    }

    /// Sets the status of this span.
    ///
    /// * `Unset` never replaces a status.
    /// * `Error` always replaces the current status, updating the description.
    /// * `Ok` replaces anything but `Error`.
    ///
    /// Does nothing once the span has ended.
    pub fn set_status(&mut self, status: Status) {
        if self.is_ended() {
            return;
        }
        let replace = !matches!(
            (&self.status, &status),
            (_, Status::Unset) | (Status::Error { .. }, Status::Ok)
        );
        if replace {
            self.status = status;
        }
    }

    /// Ends the span and hands it to the provider's span processors.
    ///
    /// Only the first call has an effect.
    pub fn end(&mut self) {
        if self.is_ended() {
            return;
        }
        let end_time = self.start_time + self.start_instant.elapsed();
        self.end_time = Some(end_time);

        let data = self.build_export_data(end_time);
        self.tracer.provider().on_end(data);
    }

    /// Marks the span ended without exporting it.
    pub(crate) fn discard(&mut self) {
        if !self.is_ended() {
            self.end_time = Some(self.start_time + self.start_instant.elapsed());
        }
    }

    fn build_export_data(&self, end_time: SystemTime) -> SpanData {
        let mut tags = self.tags.clone();
        tags.sort_by(|a, b| a.key.cmp(&b.key));

        let (parent_span_id, parent_span_is_remote) = match &self.parent {
            Some(parent) => (parent.span_id(), parent.is_remote()),
            None => (tracebridge::trace::SpanId::INVALID, false),
        };

        SpanData {
            span_context: self.span_context.clone(),
            parent_span_id,
            parent_span_is_remote,
            span_kind: self.kind.clone(),
            name: self.name.clone(),
            start_time: self.start_time,
            end_time,
            tags,
            status: self.status.clone(),
            scope_name: Cow::Owned(self.tracer.scope_name().to_owned()),
            service_name: self.tracer.provider().config().service_name.clone(),
        }
    }
}

impl Drop for Span {
    /// Spans never closed with `end` are not exported.
    fn drop(&mut self) {
        self.discard();
    }
}
