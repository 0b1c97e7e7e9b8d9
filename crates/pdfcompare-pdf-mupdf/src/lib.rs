use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use mupdf::{Document, Page, TextPageFlags};
use tokio_util::sync::CancellationToken;

use pdfcompare_core::{
    ExtractionBackend, ExtractionError, ExtractionRequest, ExtractionResult, assemble_pages,
};

/// MuPDF-based implementation of [`ExtractionBackend`].
///
/// This crate is the sole AGPL island. It isolates the mupdf dependency
/// (which is AGPL-3.0) so the HTTP and remote code paths do not transitively
/// depend on it.
///
/// Text is read from MuPDF's structured text page (block → line → char),
/// which follows reading order rather than raw content-stream order.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Parse `data` and return its text, checking `cancel` before each page.
///
/// Synchronous and CPU-bound; async callers should go through
/// [`ExtractionBackend::extract`], which runs this on the blocking pool.
/// The document handle is dropped on every return path, cancellation included.
pub fn extract_text(data: &[u8], cancel: &CancellationToken) -> Result<String, ExtractionError> {
    if cancel.is_cancelled() {
        return Err(ExtractionError::Cancelled);
    }

    let document = Document::from_bytes(data, "application/pdf").map_err(ExtractionError::failed)?;
    let pages = document.pages().map_err(ExtractionError::failed)?;

    assemble_pages(pages.map(|page| page.and_then(|p| page_text(&p))), cancel)
}

fn page_text(page: &Page) -> Result<String, mupdf::Error> {
    let text_page = page.to_text_page(TextPageFlags::empty())?;

    let mut page_text = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            page_text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
            page_text.push('\n');
        }
    }
    Ok(page_text)
}

impl ExtractionBackend for MupdfBackend {
    fn name(&self) -> &str {
        "mupdf"
    }

    fn extract<'a>(
        &'a self,
        request: ExtractionRequest,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<ExtractionResult, ExtractionError>> + Send + 'a>> {
        let cancel = cancel.clone();
        Box::pin(async move {
            let file_name = request.file_name.clone();
            let size = request.len();
            let start = Instant::now();

            // The blocking task keeps running if this future is dropped; it
            // stops at the next page once the token is cancelled.
            let text = tokio::task::spawn_blocking(move || extract_text(&request.data, &cancel))
                .await
                .map_err(|e| ExtractionError::failed_msg(format!("extraction task failed: {e}")))??;

            tracing::debug!(
                file = %file_name,
                size,
                chars = text.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "mupdf extraction complete"
            );
            Ok(ExtractionResult::new(text))
        })
    }
}
