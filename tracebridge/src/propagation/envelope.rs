use crate::propagation::codec::{self, EnvelopeFields};
use crate::propagation::DecodeError;
use crate::trace::SpanContext;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The unit that crosses the transport: a propagated context next to the
/// application payload.
///
/// The context fields are kept in wire form. Building an envelope never fails;
/// turning one back into a [`SpanContext`] is done by [`context`], which
/// validates every field.
///
/// [`context`]: PropagationEnvelope::context
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationEnvelope {
    /// Hex encoded trace id.
    pub trace_id: String,
    /// Hex encoded span id.
    pub span_id: String,
    /// Hex encoded trace flags.
    pub trace_flags: String,
    /// Application payload, opaque to this crate.
    pub message: String,
}

impl PropagationEnvelope {
    /// Bundle encoded context fields with an application message.
    pub fn new(fields: EnvelopeFields, message: impl Into<String>) -> Self {
        PropagationEnvelope {
            trace_id: fields.trace_id,
            span_id: fields.span_id,
            trace_flags: fields.trace_flags,
            message: message.into(),
        }
    }

    /// Parse an envelope from a received message body.
    ///
    /// Context keys absent from the document come back as empty strings and
    /// are reported by [`context`](PropagationEnvelope::context). A body that
    /// is not a JSON object, or whose keys do not hold strings, is
    /// [`DecodeError::Malformed`] for the `envelope` field.
    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(body)
            .map_err(|err| DecodeError::malformed("envelope", err.to_string()))
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> String {
        // Serializing a struct of strings cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Serialize to the JSON wire form as transport payload bytes.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_json())
    }

    /// The context fields in wire form.
    pub fn fields(&self) -> EnvelopeFields {
        EnvelopeFields {
            trace_id: self.trace_id.clone(),
            span_id: self.span_id.clone(),
            trace_flags: self.trace_flags.clone(),
        }
    }

    /// Decode the carried context.
    pub fn context(&self) -> Result<SpanContext, DecodeError> {
        codec::decode(&self.fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{SpanId, TraceFlags, TraceId};

    fn example_context() -> SpanContext {
        SpanContext::new(
            TraceId::from_u128(0x4bf9_2f35_77b3_4da6_a3ce_929d_0e0e_4736),
            SpanId::from_u64(0x00f0_67aa_0ba9_02b7),
            TraceFlags::SAMPLED,
            false,
        )
    }

    #[test]
    fn serializes_wire_format() {
        let envelope = PropagationEnvelope::new(codec::encode(&example_context()), "hello");

        assert_eq!(
            envelope.to_json(),
            r#"{"trace_id":"4bf92f3577b34da6a3ce929d0e0e4736","span_id":"00f067aa0ba902b7","trace_flags":"01","message":"hello"}"#
        );
    }

    #[test]
    fn parses_wire_format() {
        let body = br#"{
            "trace_id": "4bf92f3577b34da6a3ce929d0e0e4736",
            "span_id": "00f067aa0ba902b7",
            "trace_flags": "01",
            "message": "hello"
        }"#;

        let envelope = PropagationEnvelope::from_slice(body).unwrap();
        assert_eq!(envelope.message, "hello");
        assert_eq!(envelope.context().unwrap(), example_context());
    }

    #[test]
    fn missing_field_is_malformed() {
        let body = br#"{"trace_id":"4bf92f3577b34da6a3ce929d0e0e4736","trace_flags":"01","message":"hello"}"#;

        let envelope = PropagationEnvelope::from_slice(body).unwrap();
        assert!(matches!(
            envelope.context(),
            Err(DecodeError::Malformed { field: "span_id", .. })
        ));
    }

    #[test]
    fn invalid_documents_are_malformed() {
        for body in [
            &b"not json"[..],
            &b"[1, 2, 3]"[..],
            &br#"{"trace_id": 42}"#[..],
            &br#"{"trace_flags": null}"#[..],
            &b""[..],
        ] {
            assert!(
                matches!(
                    PropagationEnvelope::from_slice(body),
                    Err(DecodeError::Malformed { field: "envelope", .. })
                ),
                "{:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let body = br#"{"trace_id":"4bf92f3577b34da6a3ce929d0e0e4736","span_id":"00f067aa0ba902b7","trace_flags":"00","message":"","extra":true}"#;

        let envelope = PropagationEnvelope::from_slice(body).unwrap();
        assert!(!envelope.context().unwrap().is_sampled());
    }
}
