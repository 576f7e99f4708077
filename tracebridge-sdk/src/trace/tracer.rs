//! # Tracer
//!
//! The `Tracer` starts [`Span`]s. There is no ambient "current span": the
//! parent of a new span is passed explicitly, either a local span's context
//! or one decoded from a received message.
use crate::trace::{SamplingDecision, Span, TracerProvider};
use std::borrow::Cow;
use std::fmt;
use tracebridge::trace::{SpanContext, SpanKind, Status};

/// `Tracer` implementation to create spans
#[derive(Clone)]
pub struct Tracer {
    scope: Cow<'static, str>,
    provider: TracerProvider,
}

impl fmt::Debug for Tracer {
    /// Omitting `provider` here is necessary to avoid cycles.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").field("name", &self.scope).finish()
    }
}

impl Tracer {
    /// Create a new tracer (used internally by `TracerProvider`s).
    pub(crate) fn new(scope: Cow<'static, str>, provider: TracerProvider) -> Self {
        Tracer { scope, provider }
    }

    /// TracerProvider associated with this tracer.
    pub(crate) fn provider(&self) -> &TracerProvider {
        &self.provider
    }

    /// Name this tracer was created with.
    pub fn scope_name(&self) -> &str {
        &self.scope
    }

    /// Starts a span.
    ///
    /// With a valid `parent` the span joins the parent's trace. Without one,
    /// or with a parent whose ids are zero, the span starts a new trace as a
    /// root. The span id is always freshly generated.
    ///
    /// The sampling decision is stored in the span's trace flags. An
    /// unsampled span still records locally but is never exported.
    pub fn start_span(
        &self,
        name: impl Into<Cow<'static, str>>,
        kind: SpanKind,
        parent: Option<&SpanContext>,
    ) -> Span {
        let (span, _) = self.build(name.into(), kind, parent);
        span
    }

    /// Starts a span only if the sampler keeps it.
    ///
    /// Returns `None` when the sampling decision is [`SamplingDecision::Drop`],
    /// so callers can skip instrumentation work entirely.
    pub fn start_sampled_span(
        &self,
        name: impl Into<Cow<'static, str>>,
        kind: SpanKind,
        parent: Option<&SpanContext>,
    ) -> Option<Span> {
        match self.build(name.into(), kind, parent) {
            (span, SamplingDecision::RecordAndSample) => Some(span),
            (mut span, SamplingDecision::Drop) => {
                span.discard();
                None
            }
        }
    }

    /// Runs `f` inside a new span and ends the span when `f` returns.
    ///
    /// `Ok` sets the span status to [`Status::Ok`], `Err` to
    /// [`Status::Error`] with the error's display text. The result of `f` is
    /// returned unchanged.
    ///
    /// ```
    /// use tracebridge::trace::SpanKind;
    /// use tracebridge_sdk::trace::{InMemorySpanExporter, TracerProvider};
    ///
    /// let exporter = InMemorySpanExporter::default();
    /// let provider = TracerProvider::builder().with_simple_exporter(exporter.clone()).build();
    /// let tracer = provider.tracer("example");
    ///
    /// let result: Result<u32, String> = tracer.in_span("parse", SpanKind::Internal, None, |span| {
    ///     span.set_tag("input.length", 2);
    ///     "42".parse::<u32>().map_err(|e| e.to_string())
    /// });
    /// assert_eq!(result, Ok(42));
    /// assert!(exporter.get_finished_spans().unwrap()[0].status == tracebridge::trace::Status::Ok);
    /// ```
    pub fn in_span<T, E, F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        kind: SpanKind,
        parent: Option<&SpanContext>,
        f: F,
    ) -> Result<T, E>
    where
        E: fmt::Display,
        F: FnOnce(&mut Span) -> Result<T, E>,
    {
        let mut span = self.start_span(name, kind, parent);
        let result = f(&mut span);
        match &result {
            Ok(_) => span.set_status(Status::Ok),
            Err(err) => span.set_status(Status::error(err.to_string())),
        }
        span.end();
        result
    }

    fn build(
        &self,
        name: Cow<'static, str>,
        kind: SpanKind,
        parent: Option<&SpanContext>,
    ) -> (Span, SamplingDecision) {
        let config = self.provider.config();
        let parent = parent.filter(|cx| cx.is_valid());

        let trace_id = match parent {
            Some(cx) => cx.trace_id(),
            None => config.id_generator.new_trace_id(),
        };
        let span_id = config.id_generator.new_span_id();

        let decision = config.sampler.should_sample(parent, trace_id, &name, &kind);
        let trace_flags = parent
            .map(|cx| cx.trace_flags())
            .unwrap_or_default()
            .with_sampled(decision == SamplingDecision::RecordAndSample);

        let span_context = SpanContext::new(trace_id, span_id, trace_flags, false);
        let span = Span::new(span_context, parent.cloned(), name, kind, self.clone());
        (span, decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{InMemorySpanExporter, Sampler};
    use tracebridge::trace::{SpanId, TraceFlags, TraceId};

    fn provider_with(sampler: Sampler) -> (TracerProvider, InMemorySpanExporter) {
        let exporter = InMemorySpanExporter::default();
        let provider = TracerProvider::builder()
            .with_sampler(sampler)
            .with_simple_exporter(exporter.clone())
            .build();
        (provider, exporter)
    }

    #[test]
    fn root_span_gets_fresh_ids() {
        let (provider, _) = provider_with(Sampler::AlwaysOn);
        let span = provider.tracer("test").start_span("root", SpanKind::Internal, None);

        assert!(span.context().is_valid());
        assert!(span.context().is_sampled());
        assert!(!span.context().is_remote());
        assert!(span.parent_context().is_none());
    }

    #[test]
    fn child_inherits_trace_id() {
        let (provider, _) = provider_with(Sampler::AlwaysOn);
        let tracer = provider.tracer("test");
        let parent = tracer.start_span("parent", SpanKind::Internal, None);
        let child = tracer.start_span("child", SpanKind::Internal, Some(parent.context()));

        assert_eq!(child.context().trace_id(), parent.context().trace_id());
        assert_ne!(child.context().span_id(), parent.context().span_id());
        assert_eq!(child.parent_context(), Some(parent.context()));
    }

    #[test]
    fn invalid_parent_starts_new_trace() {
        let (provider, _) = provider_with(Sampler::AlwaysOn);
        let span = provider
            .tracer("test")
            .start_span("orphan", SpanKind::Internal, Some(&SpanContext::NONE));

        assert!(span.context().is_valid());
        assert!(span.parent_context().is_none());
    }

    #[test]
    fn parent_based_sampler_follows_remote_decision() {
        let (provider, _) = provider_with(Sampler::ParentBased(Box::new(Sampler::AlwaysOn)));
        let remote = SpanContext::new(
            TraceId::from_u128(0x4bf9_2f35),
            SpanId::from_u64(0x00f0_67aa),
            TraceFlags::NOT_SAMPLED,
            true,
        );
        let span = provider
            .tracer("test")
            .start_span("consume", SpanKind::Consumer, Some(&remote));

        assert!(!span.context().is_sampled());
    }

    #[test]
    fn start_sampled_span_returns_none_when_dropped() {
        let (provider, exporter) = provider_with(Sampler::AlwaysOff);
        let tracer = provider.tracer("test");

        assert!(tracer
            .start_sampled_span("dropped", SpanKind::Internal, None)
            .is_none());
        assert!(exporter.get_finished_spans().unwrap().is_empty());

        let (provider, _) = provider_with(Sampler::AlwaysOn);
        assert!(provider
            .tracer("test")
            .start_sampled_span("kept", SpanKind::Internal, None)
            .is_some());
    }

    #[test]
    fn in_span_records_outcome() {
        let (provider, exporter) = provider_with(Sampler::AlwaysOn);
        let tracer = provider.tracer("test");

        let ok: Result<(), String> = tracer.in_span("ok", SpanKind::Internal, None, |_| Ok(()));
        let err: Result<(), String> = tracer.in_span("err", SpanKind::Internal, None, |_| {
            Err("queue not found".to_string())
        });

        assert!(ok.is_ok());
        assert_eq!(err, Err("queue not found".to_string()));

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].status, Status::Ok);
        assert_eq!(spans[1].status, Status::error("queue not found"));
    }

    #[test]
    fn scope_name_is_exported() {
        let (provider, exporter) = provider_with(Sampler::AlwaysOn);
        let tracer = provider.tracer("orders-consumer");
        assert_eq!(tracer.scope_name(), "orders-consumer");

        tracer.start_span("work", SpanKind::Internal, None).end();

        assert_eq!(
            exporter.get_finished_spans().unwrap()[0].scope_name,
            "orders-consumer"
        );
    }
}
