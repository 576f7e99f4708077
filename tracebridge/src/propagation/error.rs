use thiserror::Error;

/// Errors returned when a received envelope cannot be turned back into a
/// [`SpanContext`](crate::trace::SpanContext).
///
/// `field` names the offending wire field: `trace_id`, `span_id`,
/// `trace_flags`, or `envelope` when the document itself is unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// A field is missing, has the wrong width, or holds characters the
    /// encoder never produces.
    #[error("malformed `{field}` in propagation envelope: {reason}")]
    Malformed {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A field is well formed but decodes to the all-zero id, which never
    /// identifies a span.
    #[error("`{field}` in propagation envelope is all zeros")]
    InvalidZeroId {
        /// The offending field.
        field: &'static str,
    },
}

impl DecodeError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        DecodeError::Malformed {
            field,
            reason: reason.into(),
        }
    }

    /// The wire field this error is about.
    pub fn field(&self) -> &'static str {
        match self {
            DecodeError::Malformed { field, .. } | DecodeError::InvalidZeroId { field } => field,
        }
    }
}
