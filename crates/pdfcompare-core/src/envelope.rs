//! JSON envelope exchanged with extraction services.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::backend::UNKNOWN_UPSTREAM_ERROR;
use crate::{ExtractionError, ExtractionResult};

/// Response body of an extraction service.
///
/// `pages` is informational only; callers do not rely on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteEnvelope {
    pub success: bool,
    pub text: Option<String>,
    pub pages: i64,
    pub filename: Option<String>,
    pub error: Option<String>,
}

impl RemoteEnvelope {
    /// Reduce the envelope to a result, enforcing the non-blank text rule.
    pub fn into_result(self, elapsed: Duration) -> Result<ExtractionResult, ExtractionError> {
        if !self.success {
            let message = self
                .error
                .unwrap_or_else(|| UNKNOWN_UPSTREAM_ERROR.to_string());
            return Err(ExtractionError::UpstreamReportedFailure(message));
        }

        match self.text {
            Some(text) if !text.trim().is_empty() => {
                Ok(ExtractionResult::new(text).with_elapsed(elapsed))
            }
            _ => Err(ExtractionError::EmptyExtraction),
        }
    }
}

/// Parse a service response body, matching field names case-insensitively.
pub fn parse_envelope(body: &str) -> Result<RemoteEnvelope, ExtractionError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ExtractionError::InvalidUpstreamResponse(format!(
            "Failed to parse response from PDF reader service: {e}"
        ))
    })?;

    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => {
            return Err(ExtractionError::InvalidUpstreamResponse(
                "PDF reader service returned null response".to_string(),
            ));
        }
        _ => {
            return Err(ExtractionError::InvalidUpstreamResponse(
                "PDF reader service returned a non-object response".to_string(),
            ));
        }
    };

    let normalized: Map<String, Value> = fields
        .into_iter()
        .map(|(key, value)| (key.to_ascii_lowercase(), value))
        .collect();

    serde_json::from_value(Value::Object(normalized)).map_err(|e| {
        ExtractionError::InvalidUpstreamResponse(format!(
            "Failed to parse response from PDF reader service: {e}"
        ))
    })
}
