//! Adapter that forwards uploads to an external extraction service.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use tokio_util::sync::CancellationToken;

use crate::envelope::parse_envelope;
use crate::{ExtractionBackend, ExtractionError, ExtractionRequest, ExtractionResult};

/// Path segment of the PyMuPDF-backed service.
pub const PY_MU_PDF_PATH: &str = "py-mu-pdf";
/// Path segment of the PdfPig-backed service.
pub const PDF_PIG_PATH: &str = "pdf-pig";
/// Deadline for a whole round trip (upload, extraction, response body).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Proxies extraction to `POST {base_url}/{path}` as a multipart upload.
///
/// The [`reqwest::Client`] is shared; clones refer to the same connection pool.
pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: String,
    path: &'static str,
    timeout: Duration,
}

impl RemoteBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, path: &'static str) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            path,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn py_mu_pdf(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self::new(client, base_url, PY_MU_PDF_PATH)
    }

    pub fn pdf_pig(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self::new(client, base_url, PDF_PIG_PATH)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.path)
    }

    async fn round_trip(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractionError> {
        // `Bytes` converts into a body without copying the upload.
        let part = Part::stream(request.data)
            .file_name(request.file_name)
            .mime_str("application/pdf")
            .map_err(|e| ExtractionError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        let url = self.endpoint();
        tracing::debug!(backend = self.path, %url, "forwarding upload");

        let start = Instant::now();
        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(transport_error)?;
        let elapsed = start.elapsed();

        if !status.is_success() {
            return Err(ExtractionError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        parse_envelope(&body)?.into_result(elapsed)
    }
}

/// A reqwest timeout is our own deadline; anything else is a transport fault.
fn transport_error(err: reqwest::Error) -> ExtractionError {
    if err.is_timeout() {
        ExtractionError::Timeout
    } else {
        ExtractionError::Transport(err.to_string())
    }
}

impl ExtractionBackend for RemoteBackend {
    fn name(&self) -> &str {
        self.path
    }

    fn extract<'a>(
        &'a self,
        request: ExtractionRequest,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<ExtractionResult, ExtractionError>> + Send + 'a>> {
        Box::pin(async move {
            // Caller cancellation takes priority over whatever the transport reports.
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ExtractionError::Cancelled),
                result = self.round_trip(request) => result,
            };

            if let Err(ref err) = result {
                tracing::debug!(backend = self.path, kind = err.kind(), error = %err, "remote extraction failed");
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_path() {
        let client = reqwest::Client::new();
        let backend = RemoteBackend::pdf_pig(client.clone(), "http://csharp-api:8080/");
        assert_eq!(backend.endpoint(), "http://csharp-api:8080/pdf-pig");

        let backend = RemoteBackend::py_mu_pdf(client, "http://python-api:5000");
        assert_eq!(backend.endpoint(), "http://python-api:5000/py-mu-pdf");
        assert_eq!(backend.name(), "py-mu-pdf");
    }

    #[test]
    fn default_timeout_applies_until_overridden() {
        let backend = RemoteBackend::pdf_pig(reqwest::Client::new(), "http://localhost");
        assert_eq!(backend.timeout, DEFAULT_TIMEOUT);
        let backend = backend.with_timeout(Duration::from_secs(5));
        assert_eq!(backend.timeout, Duration::from_secs(5));
    }
}
