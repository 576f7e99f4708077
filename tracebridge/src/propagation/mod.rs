//! # Context propagation over message payloads
//!
//! Queues carry nothing but the message body, so the trace context travels
//! inside it. A [`PropagationEnvelope`] is that body: the three textual
//! context fields produced by [`codec::encode`] next to the opaque
//! application message, serialized as one JSON document.
//!
//! ```json
//! {
//!   "trace_id": "4bf92f3577b34da6a3ce929d0e0e4736",
//!   "span_id": "00f067aa0ba902b7",
//!   "trace_flags": "01",
//!   "message": "hello"
//! }
//! ```
//!
//! Decoding is strict. Anything other than the encoder's own output is a
//! [`DecodeError`]; a context is never guessed or defaulted.
pub mod codec;
mod envelope;
mod error;

pub use codec::EnvelopeFields;
pub use envelope::PropagationEnvelope;
pub use error::DecodeError;
