//! # Trace Provider SDK
//!
//! The `TracerProvider` creates [`Tracer`] instances and owns the span
//! processors every ended span is handed to. Tracers created from the same
//! provider share its [`Config`], so sampling, id generation and the service
//! name are uniform across them.
//!
//! Cloning a `TracerProvider` creates a new reference to the same provider.
//! Dropping the last reference shuts the processors down. Once shut down,
//! spans still start and end but nothing is exported any more.
//!
//! ```
//! use tracebridge::trace::SpanKind;
//! use tracebridge_sdk::trace::{InMemorySpanExporter, Sampler, TracerProvider};
//!
//! let exporter = InMemorySpanExporter::default();
//! let provider = TracerProvider::builder()
//!     .with_sampler(Sampler::AlwaysOn)
//!     .with_service_name("checkout")
//!     .with_simple_exporter(exporter.clone())
//!     .build();
//!
//! let mut span = provider.tracer("example/client").start_span("test_span", SpanKind::Client, None);
//! span.end();
//!
//! provider.shutdown().unwrap();
//! ```
use crate::trace::{
    Config, IdGenerator, Sampler, SimpleSpanProcessor, SpanData, SpanExporter, SpanProcessor,
    TraceError, TraceResult, Tracer,
};
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracebridge::{bridge_debug, bridge_info};

/// TracerProvider inner type
#[derive(Debug)]
pub(crate) struct TracerProviderInner {
    processors: Vec<Box<dyn SpanProcessor>>,
    config: Config,
    is_shutdown: AtomicBool,
}

impl TracerProviderInner {
    fn shutdown(&self) -> Vec<TraceResult<()>> {
        let mut results = vec![];
        for processor in &self.processors {
            let result = processor.shutdown();
            if let Err(err) = &result {
                bridge_debug!(name: "TracerProvider.ShutdownError", error = format!("{err}"));
            }
            results.push(result);
        }
        results
    }
}

impl Drop for TracerProviderInner {
    fn drop(&mut self) {
        if !self.is_shutdown.load(Ordering::Relaxed) {
            let _ = self.shutdown();
        } else {
            bridge_debug!(
                name: "TracerProvider.Drop.AlreadyShutdown",
                message = "TracerProvider was already shut down; drop will not attempt shutdown again."
            );
        }
    }
}

/// Creator of [`Tracer`] instances and owner of the export pipeline.
#[derive(Clone, Debug)]
pub struct TracerProvider {
    inner: Arc<TracerProviderInner>,
}

impl Default for TracerProvider {
    fn default() -> Self {
        TracerProvider::builder().build()
    }
}

impl TracerProvider {
    /// Create a new [`TracerProvider`] builder.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Create a tracer whose spans are reported under `name`.
    pub fn tracer(&self, name: impl Into<Cow<'static, str>>) -> Tracer {
        Tracer::new(name.into(), self.clone())
    }

    /// Config associated with this provider
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// true if the provider has been shutdown
    pub(crate) fn is_shutdown(&self) -> bool {
        self.inner.is_shutdown.load(Ordering::Relaxed)
    }

    /// Hands an ended span to every processor.
    pub(crate) fn on_end(&self, span: SpanData) {
        if self.is_shutdown() {
            return;
        }
        match self.inner.processors.as_slice() {
            [] => {}
            [processor] => processor.on_end(span),
            processors => {
                for processor in processors {
                    processor.on_end(span.clone());
                }
            }
        }
    }

    /// Force flush all remaining spans in span processors.
    pub fn force_flush(&self) -> TraceResult<()> {
        let errors: Vec<_> = self
            .inner
            .processors
            .iter()
            .map(|processor| processor.force_flush())
            .filter_map(Result::err)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TraceError::from(format!("Flush errors: {:?}", errors)))
        }
    }

    /// Shuts down the current `TracerProvider`.
    ///
    /// A second call returns [`TraceError::TracerProviderAlreadyShutdown`].
    pub fn shutdown(&self) -> TraceResult<()> {
        if self
            .inner
            .is_shutdown
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let errors: Vec<_> = self
                .inner
                .shutdown()
                .into_iter()
                .filter_map(Result::err)
                .collect();
            if errors.is_empty() {
                Ok(())
            } else {
                Err(TraceError::from(format!("Shutdown errors: {:?}", errors)))
            }
        } else {
            Err(TraceError::TracerProviderAlreadyShutdown)
        }
    }
}

/// Builder for provider attributes.
#[derive(Debug, Default)]
pub struct Builder {
    processors: Vec<Box<dyn SpanProcessor>>,
    config: Config,
}

impl Builder {
    /// The `SpanExporter` that this provider should use, wrapped in a
    /// [`SimpleSpanProcessor`].
    pub fn with_simple_exporter<T: SpanExporter + 'static>(self, exporter: T) -> Self {
        self.with_span_processor(SimpleSpanProcessor::new(Box::new(exporter)))
    }

    /// Add a [`SpanProcessor`]. Every processor receives every ended span.
    pub fn with_span_processor<T: SpanProcessor + 'static>(self, processor: T) -> Self {
        let mut processors = self.processors;
        processors.push(Box::new(processor));

        Builder { processors, ..self }
    }

    /// Replace the whole configuration.
    pub fn with_config(self, config: Config) -> Self {
        Builder { config, ..self }
    }

    /// The sampler to use for spans started by this provider's tracers.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.config.sampler = sampler;
        self
    }

    /// The [`IdGenerator`] to use for new trace and span ids.
    pub fn with_id_generator<T: IdGenerator + 'static>(mut self, id_generator: T) -> Self {
        self.config.id_generator = Box::new(id_generator);
        self
    }

    /// The service name recorded on every exported span.
    pub fn with_service_name(mut self, service_name: impl Into<Cow<'static, str>>) -> Self {
        self.config.service_name = service_name.into();
        self
    }

    /// Create a new provider from this configuration.
    pub fn build(self) -> TracerProvider {
        bridge_info!(
            name: "TracerProvider.Built",
            processor_count = self.processors.len(),
            service_name = self.config.service_name.to_string()
        );
        TracerProvider {
            inner: Arc::new(TracerProviderInner {
                processors: self.processors,
                config: self.config,
                is_shutdown: AtomicBool::new(false),
            }),
        }
    }
}
