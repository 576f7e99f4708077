use tracebridge::trace::{SpanContext, SpanKind, TraceId};

/// Decision made by a [`Sampler`] for a span that is about to start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplingDecision {
    /// The span is not sampled. It still records locally but is never
    /// handed to an exporter, and its children inherit the decision when the
    /// sampler is parent based.
    Drop,
    /// The span is sampled and will be exported once ended.
    RecordAndSample,
}

/// Built-in sampling strategies.
///
/// The decision is written into the `sampled` bit of the new span's
/// [`TraceFlags`](tracebridge::trace::TraceFlags), which travels inside
/// propagation envelopes. A consumer using [`Sampler::ParentBased`] therefore
/// follows the producer's decision.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Sampler {
    /// Always sample the trace
    AlwaysOn,
    /// Never sample the trace
    AlwaysOff,
    /// Respects the parent span's sampling decision or delegates to another sampler for root spans.
    ParentBased(Box<Sampler>),
    /// Sample a given fraction of traces. Fractions >= 1 will always sample.
    /// Fractions < 0 are treated as zero. The decision is derived from the
    /// trace id, so every span of a trace gets the same one.
    TraceIdRatioBased(f64),
}

impl Sampler {
    /// Decide whether a span starting now is sampled.
    pub fn should_sample(
        &self,
        parent: Option<&SpanContext>,
        trace_id: TraceId,
        name: &str,
        span_kind: &SpanKind,
    ) -> SamplingDecision {
        match self {
            Sampler::AlwaysOn => SamplingDecision::RecordAndSample,
            Sampler::AlwaysOff => SamplingDecision::Drop,
            Sampler::ParentBased(delegate) => match parent.filter(|cx| cx.is_valid()) {
                Some(parent) if parent.is_sampled() => SamplingDecision::RecordAndSample,
                Some(_) => SamplingDecision::Drop,
                None => delegate.should_sample(None, trace_id, name, span_kind),
            },
            Sampler::TraceIdRatioBased(prob) => sample_based_on_probability(prob, trace_id),
        }
    }
}

pub(crate) fn sample_based_on_probability(prob: &f64, trace_id: TraceId) -> SamplingDecision {
    if *prob >= 1.0 {
        SamplingDecision::RecordAndSample
    } else {
        let prob_upper_bound = (prob.max(0.0) * (1u64 << 63) as f64) as u64;
        let bytes = trace_id.to_bytes();
        let mut low = [0u8; 8];
        low.copy_from_slice(&bytes[8..]);
        let rnd_from_trace_id = u64::from_be_bytes(low) >> 1;

        if rnd_from_trace_id < prob_upper_bound {
            SamplingDecision::RecordAndSample
        } else {
            SamplingDecision::Drop
        }
    }
}
