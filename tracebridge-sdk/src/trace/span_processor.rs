//! # Span Processor
//!
//! Span processors are the hook between ended spans and exporters. Every
//! processor registered on a [`TracerProvider`] receives each ended span
//! exactly once through [`SpanProcessor::on_end`]. Registering several
//! processors is how spans fan out to several destinations.
//!
//! ```ascii
//!   +-----+--------------+   +---------------------+   +-------------------+
//!   |     |              |   |                     |   |                   |
//!   |     |              |   | SimpleSpanProcessor |   |  SpanExporter     |
//!   |     |              +---> ...                 +--->  (stdout, memory) |
//!   | SDK | Span.end()   |   |                     |   |                   |
//!   |     |              |   +---------------------+   +-------------------+
//!   +-----+--------------+
//! ```
//!
//! [`TracerProvider`]: crate::trace::TracerProvider
use crate::trace::{SpanData, SpanExporter, TraceError, TraceResult};
use std::fmt::Debug;
use std::sync::Mutex;
use tracebridge::bridge_debug;

/// `SpanProcessor` is an interface which allows hooks for span end method
/// invocations.
pub trait SpanProcessor: Send + Sync + Debug {
    /// `on_end` is called after a span is ended (i.e., the end timestamp is
    /// already set). This method is called synchronously within the
    /// `Span::end` API, therefore it should not block or throw an exception.
    fn on_end(&self, span: SpanData);

    /// Force the spans lying in the cache to be exported.
    fn force_flush(&self) -> TraceResult<()>;

    /// Shuts down the processor. Called when SDK is shut down. This is an
    /// opportunity for processors to do any cleanup required.
    fn shutdown(&self) -> TraceResult<()>;
}

/// A [SpanProcessor] that passes ended spans to the configured
/// `SpanExporter`, as soon as they are ended, without any batching.
///
/// Spans without the `sampled` flag are not exported.
#[derive(Debug)]
pub struct SimpleSpanProcessor {
    exporter: Mutex<Box<dyn SpanExporter>>,
}

impl SimpleSpanProcessor {
    /// Create a new [SimpleSpanProcessor] using the provided exporter.
    pub fn new(exporter: Box<dyn SpanExporter>) -> Self {
        Self {
            exporter: Mutex::new(exporter),
        }
    }
}

impl SpanProcessor for SimpleSpanProcessor {
    fn on_end(&self, span: SpanData) {
        if !span.span_context.is_sampled() {
            return;
        }

        let result = self
            .exporter
            .lock()
            .map_err(|_| TraceError::Other("SimpleSpanProcessor mutex poison".into()))
            .and_then(|mut exporter| futures_executor::block_on(exporter.export(vec![span])));

        if let Err(err) = result {
            bridge_debug!(
                name: "SimpleProcessor.OnEnd.Error",
                reason = format!("{:?}", err)
            );
        }
    }

    fn force_flush(&self) -> TraceResult<()> {
        let mut exporter = self
            .exporter
            .lock()
            .map_err(|_| TraceError::Other("SimpleSpanProcessor mutex poison at flush".into()))?;
        futures_executor::block_on(exporter.force_flush())
    }

    fn shutdown(&self) -> TraceResult<()> {
        if let Ok(mut exporter) = self.exporter.lock() {
            exporter.shutdown();
            Ok(())
        } else {
            Err(TraceError::Other(
                "SimpleSpanProcessor mutex poison at shutdown".into(),
            ))
        }
    }
}
