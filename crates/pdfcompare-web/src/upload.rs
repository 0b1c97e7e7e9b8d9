use axum::extract::Multipart;
use axum::http::StatusCode;

use pdfcompare_core::ExtractionRequest;

use crate::error::ApiError;

pub const NOT_MULTIPART: &str = "Expected multipart/form-data with a file field.";
pub const NO_FILE: &str = "No file provided.";
pub const EMPTY_FILE: &str = "File is empty.";

/// Preferred field name for the uploaded document.
const FILE_FIELD: &str = "file";

/// Pull the document out of a multipart form.
///
/// Only parts carrying a file name count as files. The part named `file` wins;
/// otherwise the first file part is used.
pub async fn read_upload(mut multipart: Multipart) -> Result<ExtractionRequest, ApiError> {
    let mut named: Option<ExtractionRequest> = None;
    let mut first: Option<ExtractionRequest> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            // Plain form value; drain and move on.
            let _ = field.bytes().await;
            continue;
        };
        let is_named = field.name() == Some(FILE_FIELD);

        if !is_named && first.is_some() {
            let _ = field.bytes().await;
            continue;
        }

        let data = field.bytes().await.map_err(multipart_error)?;
        let request = ExtractionRequest::new(file_name, data);

        if is_named {
            named = Some(request);
            break;
        }
        first = Some(request);
    }

    let request = named.or(first).ok_or_else(|| ApiError::bad_request(NO_FILE))?;
    if request.is_empty() {
        return Err(ApiError::bad_request(EMPTY_FILE));
    }
    Ok(request)
}

/// Keep axum's status (413 for the body limit), but never report a broken
/// upload as a server fault.
fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    let status = err.status();
    let status = if status.is_client_error() {
        status
    } else {
        StatusCode::BAD_REQUEST
    };
    ApiError::Rejected {
        status,
        message: format!("Failed to read form field: {}", err.body_text()),
    }
}
