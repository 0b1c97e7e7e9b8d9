use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Extraction response (same field set as the remote envelope) ─────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResponse {
    pub success: bool,
    pub text: Option<String>,
    /// Always 0. Kept so the shape matches what extraction services return.
    pub pages: i64,
    pub filename: Option<String>,
    pub error: Option<String>,
}

impl ExtractionResponse {
    pub fn success(text: String, filename: String) -> Self {
        Self {
            success: true,
            text: Some(text),
            pages: 0,
            filename: Some(filename),
            error: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            text: None,
            pages: 0,
            filename: None,
            error: Some(error),
        }
    }
}

/// Body for uploads rejected before any backend runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionBody {
    pub success: bool,
    pub error: String,
}

impl RejectionBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

// ── Service metadata ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub message: String,
    pub role: String,
    /// Route → description.
    pub endpoints: BTreeMap<String, String>,
}
