use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use crate::models::IndexResponse;
use crate::state::AppState;

pub async fn index(State(state): State<Arc<AppState>>) -> Json<IndexResponse> {
    let mut endpoints: std::collections::BTreeMap<String, String> = state
        .endpoints
        .iter()
        .map(|(path, backend)| {
            (
                path.clone(),
                format!("POST - Extract text from an uploaded PDF via {backend}"),
            )
        })
        .collect();
    endpoints.insert("/health".to_string(), "GET - Health check".to_string());

    Json(IndexResponse {
        message: "PDF text extraction comparison API".to_string(),
        role: state.role.as_str().to_string(),
        endpoints,
    })
}
