use tracing_subscriber::EnvFilter;

use pdfcompare_core::config_file;
use pdfcompare_web::config::ServerSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pdfcompare=info,tower_http=info")),
        )
        .init();

    let file = config_file::load_config();
    let settings = ServerSettings::from_env(&file)?;

    // One pool for every remote backend.
    let client = reqwest::Client::builder().build()?;
    let mounts = pdfcompare_web::mounts_for(&settings, &client);

    if mounts.is_empty() {
        tracing::warn!(
            role = settings.role.as_str(),
            "no extraction routes mounted; set PY_MU_PDF_URL and/or PDF_PIG_URL"
        );
    }
    for mount in &mounts {
        tracing::info!(route = %mount.path, backend = mount.backend.name(), "mounted");
    }

    let app = pdfcompare_web::router(settings.role, mounts, settings.max_upload_bytes());

    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    tracing::info!(
        addr = %settings.bind,
        role = settings.role.as_str(),
        max_upload_mb = settings.max_upload_mb,
        "listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
