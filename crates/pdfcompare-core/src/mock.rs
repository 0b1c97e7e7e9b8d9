//! Mock extraction backend for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{ExtractionBackend, ExtractionError, ExtractionRequest, ExtractionResult};

/// A configurable mock response for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this text.
    Text(String),
    /// Echo the uploaded bytes back as UTF-8 text.
    Echo,
    Empty,
    /// Simulate a native library failure with this message.
    Failed(String),
    /// Simulate a remote `success:false` envelope.
    Reported(String),
    Timeout,
    /// Wait until the caller cancels, then report it.
    UntilCancelled,
}

/// A hand-rolled spy implementing [`ExtractionBackend`] for tests.
///
/// Counts calls and records the file names it was handed.
pub struct MockBackend {
    name: &'static str,
    response: MockResponse,
    delay: Option<Duration>,
    call_count: AtomicUsize,
    file_names: Mutex<Vec<String>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl MockBackend {
    pub fn new(name: &'static str, response: MockResponse) -> Self {
        Self {
            name,
            response,
            delay: None,
            call_count: AtomicUsize::new(0),
            file_names: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Set simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `extract()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// File names seen so far, in call order.
    pub fn file_names(&self) -> Vec<String> {
        self.file_names
            .lock()
            .map(|names| names.clone())
            .unwrap_or_default()
    }

    /// Clones of the cancellation tokens handed to each call, in call order.
    ///
    /// They share state with the caller's tokens, so a test can check whether
    /// the caller cancelled after the call future was dropped.
    pub fn tokens(&self) -> Vec<CancellationToken> {
        self.tokens
            .lock()
            .map(|tokens| tokens.clone())
            .unwrap_or_default()
    }
}

impl ExtractionBackend for MockBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn extract<'a>(
        &'a self,
        request: ExtractionRequest,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<ExtractionResult, ExtractionError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut names) = self.file_names.lock() {
            names.push(request.file_name.clone());
        }
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.push(cancel.clone());
        }
        let response = self.response.clone();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ExtractionError::Cancelled),
                    _ = tokio::time::sleep(d) => {}
                }
            }

            match response {
                MockResponse::Text(text) => Ok(ExtractionResult::new(text)),
                MockResponse::Echo => {
                    let text = String::from_utf8_lossy(&request.data).into_owned();
                    if text.trim().is_empty() {
                        Err(ExtractionError::EmptyExtraction)
                    } else {
                        Ok(ExtractionResult::new(text))
                    }
                }
                MockResponse::Empty => Err(ExtractionError::EmptyExtraction),
                MockResponse::Failed(msg) => Err(ExtractionError::failed_msg(msg)),
                MockResponse::Reported(msg) => Err(ExtractionError::UpstreamReportedFailure(msg)),
                MockResponse::Timeout => Err(ExtractionError::Timeout),
                MockResponse::UntilCancelled => {
                    cancel.cancelled().await;
                    Err(ExtractionError::Cancelled)
                }
            }
        })
    }
}
