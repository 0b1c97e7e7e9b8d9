use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use pdfcompare_core::config_file;
use pdfcompare_core::{ExtractionBackend, ExtractionRequest, RemoteBackend, RemoteSettings};
use pdfcompare_pdf_mupdf::MupdfBackend;

mod output;

use output::{BackendOutcome, ColorMode};

/// PDF text extraction comparison - run one backend or several side by side
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text from a PDF with a single backend and print it
    Extract {
        /// Path to the PDF file
        file_path: PathBuf,

        /// Which backend to use
        #[arg(long, value_enum, default_value_t = BackendChoice::Local)]
        backend: BackendChoice,

        /// Base URL of the remote service (overrides env and config file)
        #[arg(long)]
        base_url: Option<String>,

        /// Remote request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Run every available backend on the same PDF and compare results
    Compare {
        /// Path to the PDF file
        file_path: PathBuf,

        /// Base URL of the py-mu-pdf service
        #[arg(long)]
        py_mu_pdf_url: Option<String>,

        /// Base URL of the pdf-pig service
        #[arg(long)]
        pdf_pig_url: Option<String>,

        /// Remote request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Characters of text to preview per backend (0 disables previews)
        #[arg(long, default_value_t = 200)]
        preview: usize,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendChoice {
    /// In-process MuPDF
    Local,
    /// Remote py-mu-pdf service
    PyMuPdf,
    /// Remote pdf-pig service
    PdfPig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file = config_file::load_config();
    let remote = RemoteSettings::from_env(&file)?;

    // Ctrl-C cancels whatever extraction is in flight.
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    match cli.command {
        Command::Extract {
            file_path,
            backend,
            base_url,
            timeout,
        } => {
            check_base_url(backend, base_url.as_deref())?;
            let remote = with_overrides(remote, backend, base_url, timeout);
            extract(&file_path, backend, &remote, &cancel).await
        }
        Command::Compare {
            file_path,
            py_mu_pdf_url,
            pdf_pig_url,
            timeout,
            preview,
            no_color,
        } => {
            let mut remote = with_overrides(remote, BackendChoice::PyMuPdf, py_mu_pdf_url, timeout);
            if let Some(url) = pdf_pig_url {
                remote.pdf_pig_url = Some(url);
            }
            let color = ColorMode(!no_color);
            compare(&file_path, &remote, preview, color, &cancel).await
        }
    }
}

/// Apply command-line flags on top of env/config-derived settings.
fn with_overrides(
    mut remote: RemoteSettings,
    backend: BackendChoice,
    base_url: Option<String>,
    timeout: Option<u64>,
) -> RemoteSettings {
    if let Some(url) = base_url {
        match backend {
            BackendChoice::PyMuPdf => remote.py_mu_pdf_url = Some(url),
            BackendChoice::PdfPig => remote.pdf_pig_url = Some(url),
            BackendChoice::Local => {}
        }
    }
    if let Some(secs) = timeout.filter(|s| *s > 0) {
        remote.timeout = Duration::from_secs(secs);
    }
    remote
}

/// `--base-url` only means something for a remote backend.
fn check_base_url(backend: BackendChoice, base_url: Option<&str>) -> anyhow::Result<()> {
    if backend == BackendChoice::Local && base_url.is_some() {
        anyhow::bail!("--base-url applies to a remote backend; pass --backend py-mu-pdf or pdf-pig");
    }
    Ok(())
}

fn build_backend(
    choice: BackendChoice,
    remote: &RemoteSettings,
    client: &reqwest::Client,
) -> anyhow::Result<Arc<dyn ExtractionBackend>> {
    let backend: Arc<dyn ExtractionBackend> = match choice {
        BackendChoice::Local => Arc::new(MupdfBackend::new()),
        BackendChoice::PyMuPdf => {
            let url = remote
                .py_mu_pdf_url
                .clone()
                .context("no py-mu-pdf URL; pass --base-url or set PY_MU_PDF_URL")?;
            Arc::new(RemoteBackend::py_mu_pdf(client.clone(), url).with_timeout(remote.timeout))
        }
        BackendChoice::PdfPig => {
            let url = remote
                .pdf_pig_url
                .clone()
                .context("no pdf-pig URL; pass --base-url or set PDF_PIG_URL")?;
            Arc::new(RemoteBackend::pdf_pig(client.clone(), url).with_timeout(remote.timeout))
        }
    };
    Ok(backend)
}

fn read_request(file_path: &Path) -> anyhow::Result<ExtractionRequest> {
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string());
    let file = std::fs::File::open(file_path)
        .with_context(|| format!("failed to open {}", file_path.display()))?;
    let request = ExtractionRequest::from_reader(file_name, file)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    anyhow::ensure!(!request.is_empty(), "{} is empty", file_path.display());
    Ok(request)
}

async fn extract(
    file_path: &Path,
    choice: BackendChoice,
    remote: &RemoteSettings,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let request = read_request(file_path)?;
    let client = reqwest::Client::new();
    let backend = build_backend(choice, remote, &client)?;

    tracing::debug!(backend = backend.name(), file = %request.file_name, size = request.len(), "extracting");
    let result = backend
        .extract(request, cancel)
        .await
        .with_context(|| format!("{} backend failed", backend.name()))?;
    println!("{}", result.text);
    Ok(())
}

async fn compare(
    file_path: &Path,
    remote: &RemoteSettings,
    preview: usize,
    color: ColorMode,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let request = read_request(file_path)?;
    let client = reqwest::Client::new();

    let mut backends = vec![build_backend(BackendChoice::Local, remote, &client)?];
    if remote.py_mu_pdf_url.is_some() {
        backends.push(build_backend(BackendChoice::PyMuPdf, remote, &client)?);
    }
    if remote.pdf_pig_url.is_some() {
        backends.push(build_backend(BackendChoice::PdfPig, remote, &client)?);
    }

    let mut stdout = std::io::stdout().lock();
    output::print_compare_header(&mut stdout, &request.file_name, request.len(), color)?;

    let mut outcomes = Vec::with_capacity(backends.len());
    for backend in &backends {
        if cancel.is_cancelled() {
            break;
        }
        let start = Instant::now();
        let result = backend.extract(request.clone(), cancel).await;
        match &result {
            Ok(r) => tracing::debug!(
                backend = backend.name(),
                chars = r.text.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "backend finished"
            ),
            Err(e) => tracing::debug!(
                backend = backend.name(),
                kind = e.kind(),
                error = %e,
                "backend failed"
            ),
        }
        let outcome = BackendOutcome {
            backend: backend.name().to_string(),
            elapsed: start.elapsed(),
            result,
        };
        output::print_outcome(&mut stdout, &outcome, color)?;
        outcomes.push(outcome);
    }

    if preview > 0 {
        output::print_previews(&mut stdout, &outcomes, preview, color)?;
    }

    if cancel.is_cancelled() {
        anyhow::bail!("interrupted");
    }
    Ok(())
}
