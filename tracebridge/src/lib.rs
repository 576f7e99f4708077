//! Trace context propagation across message queues.
//!
//! A span started in one process can be continued in another one that only
//! ever sees a queued message. `tracebridge` defines the pieces both sides
//! agree on:
//!
//! * [`trace`]: the identifiers of a span ([`TraceId`], [`SpanId`],
//!   [`TraceFlags`]) bundled in a [`SpanContext`], plus the span vocabulary
//!   ([`SpanKind`], [`Status`]) and tag values ([`KeyValue`]).
//! * [`propagation`]: the codec turning a [`SpanContext`] into the textual
//!   fields of a [`PropagationEnvelope`] and back.
//! * [`transport`]: the narrow [`Transport`] interface a message queue
//!   client has to provide.
//!
//! Span lifecycle, sampling and export live in the `tracebridge_sdk` crate.
//!
//! ## Example
//!
//! ```
//! use tracebridge::propagation::{codec, PropagationEnvelope};
//! use tracebridge::trace::{SpanContext, SpanId, TraceFlags, TraceId};
//!
//! let cx = SpanContext::new(
//!     TraceId::from_u128(0x4bf9_2f35_77b3_4da6_a3ce_929d_0e0e_4736),
//!     SpanId::from_u64(0x00f0_67aa_0ba9_02b7),
//!     TraceFlags::SAMPLED,
//!     false,
//! );
//!
//! let envelope = PropagationEnvelope::new(codec::encode(&cx), "hello");
//! let json = envelope.to_json();
//!
//! let received = PropagationEnvelope::from_slice(json.as_bytes()).unwrap();
//! let restored = received.context().unwrap();
//! assert_eq!(restored.trace_id(), cx.trace_id());
//! assert_eq!(restored.span_id(), cx.span_id());
//! ```
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod common;
mod internal_logging;

pub mod propagation;
pub mod trace;
pub mod transport;

pub use common::{Key, KeyValue, StringValue, Value};
pub use propagation::{DecodeError, PropagationEnvelope};
pub use trace::{SpanContext, SpanId, SpanKind, Status, TraceFlags, TraceId};
pub use transport::{MessageId, ReceivedMessage, Transport, TransportError};

#[doc(hidden)]
#[cfg(feature = "internal-logs")]
pub mod _private {
    pub use tracing::{debug, error, info, warn};
}
