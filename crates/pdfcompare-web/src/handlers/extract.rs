use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use tokio_util::sync::CancellationToken;

use pdfcompare_core::ExtractionBackend;

use crate::error::ApiError;
use crate::models::ExtractionResponse;
use crate::upload::{self, NOT_MULTIPART};

/// `POST /{route}`: run the mounted backend on one multipart upload.
pub async fn extract(
    State(backend): State<Arc<dyn ExtractionBackend>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractionResponse>, ApiError> {
    let multipart = multipart.map_err(|_| ApiError::bad_request(NOT_MULTIPART))?;
    let request = upload::read_upload(multipart).await?;
    let file_name = request.file_name.clone();
    let size = request.len();

    // Dropping this future (client disconnect) cancels the token, which stops
    // the page loop or aborts the outbound call.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let start = Instant::now();
    match backend.extract(request, &cancel).await {
        Ok(result) => {
            tracing::info!(
                backend = backend.name(),
                file = %file_name,
                size,
                chars = result.text.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "extraction succeeded"
            );
            Ok(Json(ExtractionResponse::success(result.text, file_name)))
        }
        Err(err) => {
            tracing::warn!(
                backend = backend.name(),
                file = %file_name,
                kind = err.kind(),
                error = %err,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "extraction failed"
            );
            Err(err.into())
        }
    }
}
