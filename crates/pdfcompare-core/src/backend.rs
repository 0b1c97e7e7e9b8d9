use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{ExtractionRequest, ExtractionResult};

/// Generic message used when a remote service reports failure without saying why.
pub const UNKNOWN_UPSTREAM_ERROR: &str = "Unknown error occurred during PDF extraction";

#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The upload itself was unusable (wrong content type, no file, empty file).
    #[error("{0}")]
    BadRequest(String),
    #[error("PDF extraction returned empty text. The PDF may not contain extractable text.")]
    EmptyExtraction,
    /// The native library failed. The library error is kept as the source.
    #[error("Failed to extract text from PDF: {message}")]
    ExtractionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    #[error("PDF extraction was cancelled.")]
    Cancelled,
    #[error(
        "PDF extraction timed out. The file may be too large or the service is unavailable."
    )]
    Timeout,
    #[error("PDF reader service returned error: {status}. {body}")]
    UpstreamError { status: u16, body: String },
    #[error("PDF extraction failed: {0}")]
    UpstreamReportedFailure(String),
    #[error("{0}")]
    InvalidUpstreamResponse(String),
    #[error("PDF reader service request failed: {0}")]
    Transport(String),
}

impl ExtractionError {
    /// Wrap a library error, keeping it as the diagnostic source.
    pub fn failed<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ExtractionError::ExtractionFailed {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// A library failure with no underlying error value.
    pub fn failed_msg(message: impl Into<String>) -> Self {
        ExtractionError::ExtractionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::BadRequest(_) => "bad_request",
            ExtractionError::EmptyExtraction => "empty_extraction",
            ExtractionError::ExtractionFailed { .. } => "extraction_failed",
            ExtractionError::Cancelled => "cancelled",
            ExtractionError::Timeout => "timeout",
            ExtractionError::UpstreamError { .. } => "upstream_error",
            ExtractionError::UpstreamReportedFailure(_) => "upstream_reported_failure",
            ExtractionError::InvalidUpstreamResponse(_) => "invalid_upstream_response",
            ExtractionError::Transport(_) => "transport",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExtractionError::Cancelled)
    }
}

/// A PDF text extraction backend.
///
/// Implementors either run a parser in-process or forward the document to
/// another service. Both report through the same [`ExtractionError`] kinds so
/// the HTTP layer can render them uniformly.
pub trait ExtractionBackend: Send + Sync {
    /// Short identifier used in logs and CLI output (e.g. "mupdf", "pdf-pig").
    fn name(&self) -> &str;

    /// Extract the full text of `request`.
    ///
    /// Implementations must stop and return [`ExtractionError::Cancelled`]
    /// once `cancel` fires.
    fn extract<'a>(
        &'a self,
        request: ExtractionRequest,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<ExtractionResult, ExtractionError>> + Send + 'a>>;
}
