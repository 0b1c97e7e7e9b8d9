//! HTTP front door: multipart upload in, uniform JSON out.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use pdfcompare_core::{PDF_PIG_PATH, PY_MU_PDF_PATH, RemoteBackend};
use pdfcompare_pdf_mupdf::MupdfBackend;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;
pub mod upload;

use config::{Role, ServerSettings};
use state::{AppState, Mount};

/// Backends this process serves, chosen once at startup from the role.
///
/// In the gateway role a route is only mounted when its base URL is set.
pub fn mounts_for(settings: &ServerSettings, client: &reqwest::Client) -> Vec<Mount> {
    match settings.role {
        Role::Local => vec![Mount::new(
            format!("/{PDF_PIG_PATH}"),
            Arc::new(MupdfBackend::new()),
        )],
        Role::Gateway => {
            let remote = &settings.remote;
            let mut mounts = Vec::new();
            if let Some(url) = &remote.py_mu_pdf_url {
                let backend = RemoteBackend::py_mu_pdf(client.clone(), url.clone())
                    .with_timeout(remote.timeout);
                mounts.push(Mount::new(format!("/{PY_MU_PDF_PATH}"), Arc::new(backend)));
            }
            if let Some(url) = &remote.pdf_pig_url {
                let backend =
                    RemoteBackend::pdf_pig(client.clone(), url.clone()).with_timeout(remote.timeout);
                mounts.push(Mount::new(format!("/{PDF_PIG_PATH}"), Arc::new(backend)));
            }
            mounts
        }
    }
}

/// Build the application router. Each mount gets its own upload route.
pub fn router(role: Role, mounts: Vec<Mount>, max_upload_bytes: usize) -> Router {
    let state = Arc::new(AppState {
        role,
        endpoints: mounts
            .iter()
            .map(|m| (m.path.clone(), m.backend.name().to_string()))
            .collect(),
    });

    let mut app: Router<Arc<AppState>> = Router::new()
        .route("/", get(handlers::index::index))
        .route("/health", get(handlers::health::health));

    for mount in mounts {
        app = app.route(
            &mount.path,
            post(handlers::extract::extract).with_state(mount.backend),
        );
    }

    app.layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
