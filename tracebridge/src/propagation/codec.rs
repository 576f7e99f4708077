//! # Context codec
//!
//! Converts a [`SpanContext`] into the three textual envelope fields and back.
//!
//! * `trace_id`: 32 lowercase hex characters, zero padded.
//! * `span_id`: 16 lowercase hex characters, zero padded.
//! * `trace_flags`: 2 lowercase hex characters, `00` or `01`.
//!
//! `decode` accepts exactly what `encode` produces, so
//! `decode(&encode(&cx))` restores the ids and flags of every valid `cx`.
use crate::propagation::DecodeError;
use crate::trace::{is_fixed_lower_hex, SpanContext, SpanId, TraceFlags, TraceId};

/// Name of the trace id field on the wire.
pub const TRACE_ID_FIELD: &str = "trace_id";
/// Name of the span id field on the wire.
pub const SPAN_ID_FIELD: &str = "span_id";
/// Name of the trace flags field on the wire.
pub const TRACE_FLAGS_FIELD: &str = "trace_flags";

const TRACE_FLAGS_WIDTH: usize = 2;

/// The context part of a propagation envelope, in wire form.
///
/// An empty string stands for a field the envelope did not carry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvelopeFields {
    /// Hex encoded [`TraceId`].
    pub trace_id: String,
    /// Hex encoded [`SpanId`].
    pub span_id: String,
    /// Hex encoded [`TraceFlags`].
    pub trace_flags: String,
}

/// Encodes a span context into its envelope fields.
///
/// Only the defined flag bits are written.
pub fn encode(cx: &SpanContext) -> EnvelopeFields {
    EnvelopeFields {
        trace_id: cx.trace_id().to_string(),
        span_id: cx.span_id().to_string(),
        trace_flags: format!("{:02x}", cx.trace_flags() & TraceFlags::SAMPLED),
    }
}

/// Decodes envelope fields into a remote span context.
///
/// Fields are checked in wire order: trace id, span id, then flags. The first
/// problem found is returned.
///
/// # Examples
///
/// ```
/// use tracebridge::propagation::{codec, DecodeError, EnvelopeFields};
///
/// let fields = EnvelopeFields {
///     trace_id: "4bf92f3577b34da6a3ce929d0e0e4736".into(),
///     span_id: "00f067aa0ba902b7".into(),
///     trace_flags: "not-a-flag".into(),
/// };
///
/// assert!(matches!(
///     codec::decode(&fields),
///     Err(DecodeError::Malformed { field: "trace_flags", .. })
/// ));
/// ```
pub fn decode(fields: &EnvelopeFields) -> Result<SpanContext, DecodeError> {
    let trace_id = decode_trace_id(&fields.trace_id)?;
    let span_id = decode_span_id(&fields.span_id)?;
    let trace_flags = decode_trace_flags(&fields.trace_flags)?;

    Ok(SpanContext::new(trace_id, span_id, trace_flags, true))
}

fn decode_trace_id(value: &str) -> Result<TraceId, DecodeError> {
    check_present(TRACE_ID_FIELD, value)?;
    let trace_id = TraceId::from_hex(value).ok_or_else(|| {
        DecodeError::malformed(
            TRACE_ID_FIELD,
            format!("expected {} lowercase hex characters", TraceId::HEX_WIDTH),
        )
    })?;
    if trace_id == TraceId::INVALID {
        return Err(DecodeError::InvalidZeroId {
            field: TRACE_ID_FIELD,
        });
    }
    Ok(trace_id)
}

fn decode_span_id(value: &str) -> Result<SpanId, DecodeError> {
    check_present(SPAN_ID_FIELD, value)?;
    let span_id = SpanId::from_hex(value).ok_or_else(|| {
        DecodeError::malformed(
            SPAN_ID_FIELD,
            format!("expected {} lowercase hex characters", SpanId::HEX_WIDTH),
        )
    })?;
    if span_id == SpanId::INVALID {
        return Err(DecodeError::InvalidZeroId {
            field: SPAN_ID_FIELD,
        });
    }
    Ok(span_id)
}

fn decode_trace_flags(value: &str) -> Result<TraceFlags, DecodeError> {
    check_present(TRACE_FLAGS_FIELD, value)?;
    if !is_fixed_lower_hex(value, TRACE_FLAGS_WIDTH) {
        return Err(DecodeError::malformed(
            TRACE_FLAGS_FIELD,
            "expected 2 lowercase hex characters",
        ));
    }
    u8::from_str_radix(value, 16)
        .ok()
        .and_then(TraceFlags::from_bits)
        .ok_or_else(|| DecodeError::malformed(TRACE_FLAGS_FIELD, "undefined flag bits set"))
}

fn check_present(field: &'static str, value: &str) -> Result<(), DecodeError> {
    if value.is_empty() {
        Err(DecodeError::malformed(field, "missing"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(trace_id: &str, span_id: &str, trace_flags: &str) -> EnvelopeFields {
        EnvelopeFields {
            trace_id: trace_id.to_string(),
            span_id: span_id.to_string(),
            trace_flags: trace_flags.to_string(),
        }
    }

    #[rustfmt::skip]
    fn round_trip_data() -> Vec<SpanContext> {
        vec![
            SpanContext::new(TraceId::from_u128(0x4bf9_2f35_77b3_4da6_a3ce_929d_0e0e_4736), SpanId::from_u64(0x00f0_67aa_0ba9_02b7), TraceFlags::SAMPLED, false),
            SpanContext::new(TraceId::from_u128(0x4bf9_2f35_77b3_4da6_a3ce_929d_0e0e_4736), SpanId::from_u64(0x00f0_67aa_0ba9_02b7), TraceFlags::NOT_SAMPLED, false),
            SpanContext::new(TraceId::from_u128(1), SpanId::from_u64(1), TraceFlags::SAMPLED, false),
            SpanContext::new(TraceId::from_u128(u128::MAX), SpanId::from_u64(u64::MAX), TraceFlags::SAMPLED, true),
        ]
    }

    #[rustfmt::skip]
    fn malformed_data() -> Vec<(EnvelopeFields, &'static str, &'static str)> {
        vec![
            (fields("", "00f067aa0ba902b7", "01"), "trace_id", "missing trace id"),
            (fields("4bf92f3577b34da6a3ce929d0e0e473", "00f067aa0ba902b7", "01"), "trace_id", "short trace id"),
            (fields("4bf92f3577b34da6a3ce929d0e0e47360", "00f067aa0ba902b7", "01"), "trace_id", "long trace id"),
            (fields("4BF92F3577B34DA6A3CE929D0E0E4736", "00f067aa0ba902b7", "01"), "trace_id", "upper case trace id"),
            (fields("4bf92f3577b34da6a3ce929d0e0e473g", "00f067aa0ba902b7", "01"), "trace_id", "non-hex trace id"),
            (fields("+bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7", "01"), "trace_id", "signed trace id"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "", "01"), "span_id", "missing span id"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "f067aa0ba902b7", "01"), "span_id", "short span id"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b$", "01"), "span_id", "non-hex span id"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "café67aa0ba902b", "01"), "span_id", "unicode span id"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7", ""), "trace_flags", "missing flags"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7", "not-a-flag"), "trace_flags", "flag name"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7", "1"), "trace_flags", "short flags"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7", "001"), "trace_flags", "long flags"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7", "02"), "trace_flags", "undefined bit"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7", "ff"), "trace_flags", "all bits"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7", "0A"), "trace_flags", "upper case flags"),
            (fields("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7", "Recorded"), "trace_flags", "enum name"),
        ]
    }

    #[test]
    fn encode_fixed_width() {
        let cx = SpanContext::new(
            TraceId::from_u128(0x2a),
            SpanId::from_u64(0x2a),
            TraceFlags::SAMPLED,
            false,
        );

        assert_eq!(
            encode(&cx),
            fields("0000000000000000000000000000002a", "000000000000002a", "01")
        );
    }

    #[test]
    fn round_trip() {
        for cx in round_trip_data() {
            let decoded = decode(&encode(&cx));
            assert_eq!(decoded, Ok(cx.clone()));
            assert!(decoded.is_ok_and(|decoded| decoded.is_remote()));
        }
    }

    #[test]
    fn reject_malformed() {
        for (input, field, reason) in malformed_data() {
            match decode(&input) {
                Err(DecodeError::Malformed { field: actual, .. }) => {
                    assert_eq!(actual, field, "{reason}")
                }
                other => panic!("{reason}: expected Malformed, got {other:?}"),
            }
        }
    }

    #[test]
    fn reject_zero_ids() {
        assert_eq!(
            decode(&fields("00000000000000000000000000000000", "00f067aa0ba902b7", "01")),
            Err(DecodeError::InvalidZeroId { field: "trace_id" })
        );
        assert_eq!(
            decode(&fields("4bf92f3577b34da6a3ce929d0e0e4736", "0000000000000000", "01")),
            Err(DecodeError::InvalidZeroId { field: "span_id" })
        );
    }

    #[test]
    fn trace_id_checked_before_span_id() {
        let err = decode(&fields("", "", "")).unwrap_err();
        assert_eq!(err.field(), "trace_id");
    }

    #[test]
    fn very_long_input_rejected() {
        let long = "a".repeat(1_000_000);
        assert!(matches!(
            decode(&fields(&long, &long, "01")),
            Err(DecodeError::Malformed { field: "trace_id", .. })
        ));
    }
}
