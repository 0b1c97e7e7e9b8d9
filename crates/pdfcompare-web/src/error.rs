use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use pdfcompare_core::ExtractionError;

use crate::models::{ExtractionResponse, RejectionBody};

/// Status returned when the extraction was cancelled but the connection is
/// still open (nginx's "client closed request").
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Everything a handler can fail with, rendered at the HTTP boundary.
#[derive(Debug)]
pub enum ApiError {
    /// The upload was refused before any backend ran.
    Rejected { status: StatusCode, message: String },
    Extraction(ExtractionError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::BadRequest(message) => ApiError::bad_request(message),
            other => ApiError::Extraction(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Rejected { status, message } => {
                (status, Json(RejectionBody::new(message))).into_response()
            }
            // Not a JSON error: the caller went away or asked to stop.
            ApiError::Extraction(ExtractionError::Cancelled) => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                    .unwrap_or(StatusCode::BAD_REQUEST)
                    .into_response()
            }
            ApiError::Extraction(err) => (
                StatusCode::BAD_REQUEST,
                Json(ExtractionResponse::failure(err.to_string())),
            )
                .into_response(),
        }
    }
}
