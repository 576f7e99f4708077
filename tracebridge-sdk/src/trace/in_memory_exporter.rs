use crate::trace::{ExportResult, SpanData, SpanExporter, TraceError, TraceResult};
use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// An in-memory span exporter that stores span data in memory.
///
/// This exporter is useful for testing and debugging purposes. It stores
/// span data in a `Vec<SpanData>`. Spans can be retrieved
/// using the `get_finished_spans` method.
///
/// Clones share the same storage, so a clone handed to the provider and the
/// original kept by the test observe the same spans.
///
/// # Example
/// ```
///# use tracebridge::trace::SpanKind;
///# use tracebridge_sdk::trace::{InMemorySpanExporterBuilder, TracerProvider};
///
/// let exporter = InMemorySpanExporterBuilder::new().build();
/// let provider = TracerProvider::builder()
///     .with_simple_exporter(exporter.clone())
///     .build();
///
/// let tracer = provider.tracer("example/in_memory_exporter");
/// let mut span = tracer.start_span("say hello", SpanKind::Server, None);
/// span.set_tag("greeting", "hello");
/// span.end();
///
/// let spans = exporter.get_finished_spans().unwrap();
/// assert_eq!(spans[0].name, "say hello");
/// ```
#[derive(Clone, Debug)]
pub struct InMemorySpanExporter {
    spans: Arc<Mutex<Vec<SpanData>>>,
    is_shutdown: Arc<AtomicBool>,
    should_reset_on_shutdown: bool,
}

impl Default for InMemorySpanExporter {
    fn default() -> Self {
        InMemorySpanExporterBuilder::new().build()
    }
}

/// Builder for [`InMemorySpanExporter`].
/// # Example
/// ```
///# use tracebridge_sdk::trace::InMemorySpanExporterBuilder;
///
/// let exporter = InMemorySpanExporterBuilder::new().build();
/// ```
#[derive(Clone, Debug)]
pub struct InMemorySpanExporterBuilder {
    should_reset_on_shutdown: bool,
}

impl Default for InMemorySpanExporterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySpanExporterBuilder {
    /// Creates a new instance of the `InMemorySpanExporterBuilder`.
    pub fn new() -> Self {
        Self {
            should_reset_on_shutdown: true,
        }
    }

    /// Keep the recorded spans when the exporter is shut down, so they can
    /// still be inspected after the provider is gone.
    pub fn keep_records_on_shutdown(self) -> Self {
        Self {
            should_reset_on_shutdown: false,
        }
    }

    /// Creates a new instance of the `InMemorySpanExporter`.
    pub fn build(&self) -> InMemorySpanExporter {
        InMemorySpanExporter {
            spans: Arc::new(Mutex::new(Vec::new())),
            is_shutdown: Arc::new(AtomicBool::new(false)),
            should_reset_on_shutdown: self.should_reset_on_shutdown,
        }
    }
}

impl InMemorySpanExporter {
    /// Returns the finished span as a vector of `SpanData`.
    ///
    /// # Errors
    ///
    /// Returns a `TraceError` if the internal lock cannot be acquired.
    pub fn get_finished_spans(&self) -> TraceResult<Vec<SpanData>> {
        self.spans
            .lock()
            .map(|spans_guard| spans_guard.iter().cloned().collect())
            .map_err(TraceError::from)
    }

    /// Clears the internal storage of finished spans.
    pub fn reset(&self) {
        let _ = self.spans.lock().map(|mut spans_guard| spans_guard.clear());
    }
}

impl SpanExporter for InMemorySpanExporter {
    fn export(&mut self, mut batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.is_shutdown.load(Ordering::Relaxed) {
            Err(TraceError::from("InMemorySpanExporter is shut down"))
        } else {
            self.spans
                .lock()
                .map(|mut spans_guard| spans_guard.append(&mut batch))
                .map_err(|err| TraceError::Other(format!("Failed to lock spans: {:?}", err).into()))
        };
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::Relaxed);
        if self.should_reset_on_shutdown {
            self.reset();
        }
    }
}
