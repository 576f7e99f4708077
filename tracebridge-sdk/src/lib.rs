//! Span lifecycle, export and queue propagation for `tracebridge`.
//!
//! * [`trace`]: the [`TracerProvider`](trace::TracerProvider) that owns the
//!   configuration and export pipeline, the [`Tracer`](trace::Tracer) that
//!   starts spans, and the [`Span`](trace::Span) itself.
//! * [`propagation`]: the [`PropagationBridge`](propagation::PropagationBridge)
//!   that attaches a span's context to an outgoing message and resumes a
//!   consumer span from a received one.
//! * [`messaging`]: traced publish/receive helpers over any
//!   [`Transport`](tracebridge::Transport), plus an in-memory queue.
//!
//! There is no global tracer. The provider is built once and handed to the
//! code that needs it.
//!
//! ## Getting started
//!
//! ```
//! use tracebridge::trace::SpanKind;
//! use tracebridge_sdk::propagation::PropagationBridge;
//! use tracebridge_sdk::trace::{InMemorySpanExporter, TracerProvider};
//!
//! let exporter = InMemorySpanExporter::default();
//! let provider = TracerProvider::builder()
//!     .with_simple_exporter(exporter.clone())
//!     .build();
//! let tracer = provider.tracer("example");
//! let bridge = PropagationBridge::new(tracer.clone());
//!
//! // Producer side
//! let mut span = tracer.start_span("produce", SpanKind::Producer, None);
//! let envelope = bridge.attach(&span, "hello");
//! span.end();
//!
//! // Consumer side, possibly another process
//! let mut consumer = bridge.extract_and_resume(&envelope, "consume").unwrap();
//! assert_eq!(consumer.context().trace_id(), span.context().trace_id());
//! consumer.end();
//!
//! assert_eq!(exporter.get_finished_spans().unwrap().len(), 2);
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

pub mod messaging;
pub mod propagation;
pub mod trace;
