use crate::SpanRecord;
use core::fmt;
use futures_util::future::BoxFuture;
use std::io::{stdout, Write};
use tracebridge_sdk::trace::{ExportError, ExportResult, SpanData, TraceError, TraceResult};

type Encoder = Box<dyn Fn(&mut dyn Write, SpanRecord) -> TraceResult<()> + Send + Sync>;

/// An exporter that writes each ended span as a JSON line to stdout, or to
/// the writer given to [`SpanExporterBuilder::with_writer`].
pub struct SpanExporter {
    writer: Option<Box<dyn Write + Send + Sync>>,
    encoder: Encoder,
}

impl SpanExporter {
    /// Create a builder to configure this exporter.
    pub fn builder() -> SpanExporterBuilder {
        SpanExporterBuilder::default()
    }
}

impl Default for SpanExporter {
    fn default() -> Self {
        SpanExporterBuilder::default().build()
    }
}

impl fmt::Debug for SpanExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpanExporter")
    }
}

impl tracebridge_sdk::trace::SpanExporter for SpanExporter {
    /// Write spans to the configured writer
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = match self.writer.as_mut() {
            Some(writer) => batch.into_iter().try_for_each(|span| {
                (self.encoder)(writer, SpanRecord::from(span))?;
                writer
                    .write_all(b"\n")
                    .map_err(|err| TraceError::from(Error::from(err)))
            }),
            None => Err(TraceError::from("exporter is shut down")),
        };
        Box::pin(futures_util::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.writer.take();
    }

    fn force_flush(&mut self) -> BoxFuture<'static, ExportResult> {
        let result = match self.writer.as_mut() {
            Some(writer) => writer
                .flush()
                .map_err(|err| TraceError::from(Error::from(err))),
            None => Ok(()),
        };
        Box::pin(futures_util::future::ready(result))
    }
}

/// Stdout exporter's error
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The writer failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A span could not be serialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ExportError for Error {
    fn exporter_name(&self) -> &'static str {
        "stdout"
    }
}

/// Configuration for the stdout span exporter
#[derive(Default)]
pub struct SpanExporterBuilder {
    writer: Option<Box<dyn Write + Send + Sync>>,
    encoder: Option<Encoder>,
}

impl fmt::Debug for SpanExporterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpanExporterBuilder")
    }
}

impl SpanExporterBuilder {
    /// Set the writer that the exporter will write to
    ///
    /// # Examples
    ///
    /// ```
    /// use tracebridge_stdout::SpanExporterBuilder;
    ///
    /// let buffer = Vec::new(); // Any type that implements `Write`
    /// let exporter = SpanExporterBuilder::default().with_writer(buffer).build();
    /// ```
    pub fn with_writer(mut self, writer: impl Write + Send + Sync + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Set the encoder that this exporter will use
    ///
    /// # Examples
    ///
    /// ```
    /// use tracebridge_sdk::trace::TraceError;
    /// use tracebridge_stdout::SpanExporterBuilder;
    ///
    /// let exporter = SpanExporterBuilder::default()
    ///     .with_encoder(|writer, span| {
    ///         serde_json::to_writer_pretty(writer, &span).map_err(|err| TraceError::Other(Box::new(err)))
    ///     })
    ///     .build();
    /// ```
    pub fn with_encoder(
        mut self,
        encoder: impl Fn(&mut dyn Write, SpanRecord) -> TraceResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.encoder = Some(Box::new(encoder));
        self
    }

    /// Create a span exporter with the current configuration
    pub fn build(self) -> SpanExporter {
        SpanExporter {
            writer: Some(self.writer.unwrap_or_else(|| Box::new(stdout()))),
            encoder: self.encoder.unwrap_or_else(|| {
                Box::new(|writer: &mut dyn Write, span: SpanRecord| {
                    serde_json::to_writer(writer, &span)
                        .map_err(|err| TraceError::from(Error::from(err)))
                })
            }),
        }
    }
}
