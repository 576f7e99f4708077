//! # Trace SDK
//!
//! The tracing SDK consist of a few main structs:
//!
//! * The [`TracerProvider`] struct which holds the [`Config`] and the span
//!   processors, and produces [`Tracer`]s.
//! * The [`Tracer`] struct which starts spans.
//! * The [`Span`] struct which is a mutable object storing information about
//!   the current operation execution until it is ended.
//!
//! An ended span becomes [`SpanData`] and is handed, exactly once, to each
//! [`SpanProcessor`] of the provider.
mod config;
mod error;
mod export;
mod id_generator;
mod in_memory_exporter;
mod provider;
mod sampler;
mod span;
mod span_processor;
mod tracer;

pub use config::Config;
pub use error::{TraceError, TraceResult};
pub use export::{ExportError, ExportResult, SpanData, SpanExporter};
#[cfg(any(feature = "testing", test))]
pub use id_generator::IncrementIdGenerator;
pub use id_generator::{IdGenerator, RandomIdGenerator};
pub use in_memory_exporter::{InMemorySpanExporter, InMemorySpanExporterBuilder};
pub use provider::{Builder, TracerProvider};
pub use sampler::{Sampler, SamplingDecision};
pub use span::Span;
pub use span_processor::{SimpleSpanProcessor, SpanProcessor};
pub use tracer::Tracer;
