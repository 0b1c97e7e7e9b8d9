use tokio_util::sync::CancellationToken;

use crate::ExtractionError;

/// Separator placed between the text of consecutive non-blank pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Join per-page text into a single document text.
///
/// `pages` is pulled lazily; the token is checked before each page is
/// requested so a parser never does work for a page after cancellation.
/// Blank pages are dropped, the rest are trimmed and joined with
/// [`PAGE_SEPARATOR`]. A blank result is [`ExtractionError::EmptyExtraction`].
pub fn assemble_pages<I, E>(pages: I, cancel: &CancellationToken) -> Result<String, ExtractionError>
where
    I: IntoIterator<Item = Result<String, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut pages = pages.into_iter();
    let mut kept: Vec<String> = Vec::new();

    loop {
        if cancel.is_cancelled() {
            return Err(ExtractionError::Cancelled);
        }
        let Some(page) = pages.next() else {
            break;
        };
        let page = page.map_err(ExtractionError::failed)?;
        // MuPDF ends every line with '\n', so untrimmed pages would stack
        // extra blank lines around the separator.
        let trimmed = page.trim();
        if !trimmed.is_empty() {
            kept.push(trimmed.to_string());
        }
    }

    let text = kept.join(PAGE_SEPARATOR).trim().to_string();
    if text.is_empty() {
        return Err(ExtractionError::EmptyExtraction);
    }
    Ok(text)
}
