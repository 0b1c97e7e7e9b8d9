use std::sync::Arc;

use pdfcompare_core::ExtractionBackend;

use crate::config::Role;

/// A backend served on one upload route.
#[derive(Clone)]
pub struct Mount {
    pub path: String,
    pub backend: Arc<dyn ExtractionBackend>,
}

impl Mount {
    pub fn new(path: impl Into<String>, backend: Arc<dyn ExtractionBackend>) -> Self {
        Self {
            path: path.into(),
            backend,
        }
    }
}

/// Shared application state accessible from the metadata handlers.
pub struct AppState {
    pub role: Role,
    /// `(route, backend name)` for every mounted upload route.
    pub endpoints: Vec<(String, String)>,
}
