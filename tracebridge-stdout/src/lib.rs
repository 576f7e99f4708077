//! Export tracebridge spans to stdout.
//!
//! Every ended span is written as one JSON document per line, which keeps the
//! output readable in a terminal and easy to feed to `jq`.
//!
//! # Examples
//!
//! ```no_run
//! use tracebridge::trace::SpanKind;
//! use tracebridge_sdk::trace::TracerProvider;
//!
//! let provider = TracerProvider::builder()
//!     .with_simple_exporter(tracebridge_stdout::SpanExporter::default())
//!     .build();
//!
//! let mut span = provider.tracer("example").start_span("hello", SpanKind::Internal, None);
//! span.end();
//!
//! // {"traceId":"...","spanId":"...","parentSpanId":"","name":"hello","kind":"internal",...
//! ```
#![warn(missing_debug_implementations, missing_docs)]

pub(crate) mod common;

mod trace;
pub use trace::*;
