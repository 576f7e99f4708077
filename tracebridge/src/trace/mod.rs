//! The `trace` module holds the identity of a span ([`SpanContext`] and its
//! ids) and the small vocabulary spans are described with ([`SpanKind`],
//! [`Status`]).
//!
//! A trace is a tree of spans sharing one [`TraceId`]. Each span has its own
//! [`SpanId`], and a child span records its parent's [`SpanContext`]. Only the
//! context ever leaves the process: the producer copies it into a message
//! envelope, the consumer decodes it and parents its own span on it.
use serde::Serialize;
use std::borrow::Cow;

mod ids;
mod span_context;

pub(crate) use ids::is_fixed_lower_hex;
pub use ids::{SpanId, TraceFlags, TraceId};
pub use span_context::SpanContext;

/// `SpanKind` describes the relationship between the span, its parents, and
/// its children in a trace.
///
/// For messaging, the sending side records a [`SpanKind::Producer`] span and
/// the receiving side a [`SpanKind::Consumer`] span parented on it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// Synchronous outgoing remote call.
    Client,
    /// Synchronous incoming remote call.
    Server,
    /// Initiator of an asynchronous request, such as enqueueing a message.
    Producer,
    /// Handler of an asynchronous request, such as a dequeued message.
    Consumer,
    /// Internal operation, the default.
    #[default]
    Internal,
}

/// The status of a span.
///
/// `Unset` is the initial state. A span that recorded an `Error` keeps it: a
/// later `Ok` does not hide a failure, see `Span::set_status` in the SDK.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// The default status.
    #[default]
    Unset,

    /// The operation contains an error.
    Error {
        /// The description of the error
        description: Cow<'static, str>,
    },

    /// The operation has been validated by an application developer or
    /// operator to have completed successfully.
    Ok,
}

impl Status {
    /// Create a new error status with a given description.
    ///
    /// # Examples
    ///
    /// ```
    /// use tracebridge::trace::Status;
    ///
    /// // record error with `str` description
    /// let error_status = Status::error("something went wrong");
    ///
    /// // or with `String` description
    /// let error_status = Status::error(format!("too many foos: {}", 42));
    /// # drop(error_status);
    /// ```
    pub fn error(description: impl Into<Cow<'static, str>>) -> Self {
        Status::Error {
            description: description.into(),
        }
    }

    /// Returns `true` for [`Status::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error { .. })
    }
}

impl Serialize for Status {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let (code, description) = match self {
            Status::Unset => ("unset", None),
            Status::Ok => ("ok", None),
            Status::Error { description } => ("error", Some(description.as_ref())),
        };
        let mut state = serializer.serialize_struct("Status", 2)?;
        state.serialize_field("code", code)?;
        state.serialize_field("description", &description)?;
        state.end()
    }
}
