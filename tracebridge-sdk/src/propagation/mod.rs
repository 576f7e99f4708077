//! # Propagation Bridge
//!
//! Joins the codec and the span lifecycle. The producer calls
//! [`PropagationBridge::attach`] to put its span's context next to the
//! message it sends. The consumer, usually in another process, calls
//! [`PropagationBridge::extract_and_resume`] on what it received and gets a
//! [`SpanKind::Consumer`] span in the same trace, parented on the producer's
//! span.
//!
//! Only the envelope's own fields decide lineage. Nothing else about the
//! consuming process is consulted.
use crate::trace::{Span, Tracer};
use std::borrow::Cow;
use tracebridge::bridge_debug;
use tracebridge::propagation::{codec, DecodeError, PropagationEnvelope};
use tracebridge::trace::SpanKind;

/// Attaches span contexts to outgoing messages and resumes traces from
/// received ones.
#[derive(Clone, Debug)]
pub struct PropagationBridge {
    tracer: Tracer,
}

impl PropagationBridge {
    /// Create a bridge that starts consumer spans with `tracer`.
    pub fn new(tracer: Tracer) -> Self {
        PropagationBridge { tracer }
    }

    /// The tracer consumer spans are started with.
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Encodes the context of `span` into an envelope carrying `message`.
    ///
    /// The span is not modified and may still be open.
    pub fn attach(&self, span: &Span, message: impl Into<String>) -> PropagationEnvelope {
        PropagationEnvelope::new(codec::encode(span.context()), message)
    }

    /// Decodes the context carried by `envelope` and starts a
    /// [`SpanKind::Consumer`] span named `name` under it.
    ///
    /// The new span shares the envelope's trace id, gets a fresh span id and
    /// records the decoded context, marked remote, as its parent. When the
    /// envelope does not decode, the error is returned as is and no span is
    /// started.
    pub fn extract_and_resume(
        &self,
        envelope: &PropagationEnvelope,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<Span, DecodeError> {
        let parent = envelope.context().map_err(|err| {
            bridge_debug!(
                name: "PropagationBridge.Extract.Failed",
                field = err.field(),
                error = format!("{err}")
            );
            err
        })?;

        Ok(self
            .tracer
            .start_span(name, SpanKind::Consumer, Some(&parent)))
    }
}
