//! PDF rendering.
//!
//! The layout engine is external. The pipeline hands it the entity name, the
//! render options and the populated document, and gets the PDF bytes back in
//! memory; nothing is written to disk.

use std::process::Stdio;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::instrument;

use docmail_documents::Document;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The engine ran and reported a failure.
    #[error("Failed to generate PDF: {0}")]
    Engine(String),

    /// The engine could not be started or talked to.
    #[error("Failed to run PDF engine: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode render request: {0}")]
    Request(#[from] serde_json::Error),

    /// The engine succeeded but produced no bytes.
    #[error("Generated PDF file is empty")]
    Empty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PageFormat {
    #[default]
    A4,
}

/// Options passed to the engine alongside the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    pub filename: String,
    pub format: PageFormat,
}

impl RenderOptions {
    /// A4 options named after the entity (`invoice`, `quote`). The attachment
    /// name is decided by the mailer, not the engine.
    pub fn for_document(document: &Document) -> Self {
        Self {
            filename: document.kind().as_str().to_string(),
            format: PageFormat::A4,
        }
    }
}

/// Produces a PDF for a populated document.
///
/// Implementations must never return an empty buffer as success.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(
        &self,
        document: &Document,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, RenderError>;
}

#[async_trait]
impl<R> PdfRenderer for std::sync::Arc<R>
where
    R: PdfRenderer + ?Sized,
{
    async fn render(
        &self,
        document: &Document,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, RenderError> {
        (**self).render(document, options).await
    }
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    entity: &'static str,
    options: &'a RenderOptions,
    document: &'a Document,
}

/// Runs an external program per render: `program [args..] <Entity>`.
///
/// The request `{entity, options, document}` is written to the child's stdin
/// as JSON; the PDF is read from its stdout. A non-zero exit is an engine
/// failure carrying the trimmed stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalPdfRenderer {
    program: String,
    args: Vec<String>,
}

impl ExternalPdfRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Split a whitespace-separated command line into program and leading args.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl PdfRenderer for ExternalPdfRenderer {
    #[instrument(skip(self, document), fields(program = %self.program, filename = %options.filename), err)]
    async fn render(
        &self,
        document: &Document,
        options: &RenderOptions,
    ) -> Result<Vec<u8>, RenderError> {
        let entity = document.kind().display_name();
        let payload = serde_json::to_vec(&RenderRequest {
            entity,
            options,
            document,
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(entity)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RenderError::Engine("engine stdin unavailable".to_string()))?;
        let feed = async move {
            let written = stdin.write_all(&payload).await;
            drop(stdin);
            written
        };

        // Feed stdin while draining stdout so neither pipe can fill up and stall.
        let (written, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("engine exited with {}", output.status)
            } else {
                stderr
            };
            return Err(RenderError::Engine(reason));
        }
        // An engine may exit without reading its input; only the exit status counts then.
        if let Err(err) = written {
            if err.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(RenderError::Io(err));
            }
        }
        if output.stdout.is_empty() {
            return Err(RenderError::Empty);
        }

        tracing::debug!(bytes = output.stdout.len(), "pdf rendered");
        Ok(output.stdout)
    }
}

/// Returns the same bytes for every document. Intended for tests/dev.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPdfRenderer {
    bytes: Vec<u8>,
}

impl StaticPdfRenderer {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl PdfRenderer for StaticPdfRenderer {
    async fn render(
        &self,
        _document: &Document,
        _options: &RenderOptions,
    ) -> Result<Vec<u8>, RenderError> {
        if self.bytes.is_empty() {
            return Err(RenderError::Empty);
        }
        Ok(self.bytes.clone())
    }
}
