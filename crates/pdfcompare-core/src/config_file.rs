use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::remote::DEFAULT_TIMEOUT;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub remote: Option<RemoteConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    /// `local` or `gateway`.
    pub role: Option<String>,
    pub max_upload_mb: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub py_mu_pdf_url: Option<String>,
    pub pdf_pig_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Platform config directory path: `<config_dir>/pdfcompare/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfcompare").join("config.toml"))
}

/// Load config by cascading CWD `.pdfcompare.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdfcompare.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_server = base.server.unwrap_or_default();
    let over_server = overlay.server.unwrap_or_default();
    let base_remote = base.remote.unwrap_or_default();
    let over_remote = overlay.remote.unwrap_or_default();

    ConfigFile {
        server: Some(ServerConfig {
            bind: over_server.bind.or(base_server.bind),
            role: over_server.role.or(base_server.role),
            max_upload_mb: over_server.max_upload_mb.or(base_server.max_upload_mb),
        }),
        remote: Some(RemoteConfig {
            py_mu_pdf_url: over_remote.py_mu_pdf_url.or(base_remote.py_mu_pdf_url),
            pdf_pig_url: over_remote.pdf_pig_url.or(base_remote.pdf_pig_url),
            timeout_secs: over_remote.timeout_secs.or(base_remote.timeout_secs),
        }),
    }
}

/// Remote service addresses after applying env vars over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    pub py_mu_pdf_url: Option<String>,
    pub pdf_pig_url: Option<String>,
    pub timeout: Duration,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            py_mu_pdf_url: None,
            pdf_pig_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RemoteSettings {
    /// Resolve from the process environment and `file`.
    pub fn from_env(file: &ConfigFile) -> Result<Self, ConfigError> {
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit variable lookup. `PY_MU_PDF_URL`,
    /// `PDF_PIG_URL` and `REMOTE_TIMEOUT_SECS` win over the file.
    pub fn resolve(
        file: &ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let remote = file.remote.clone().unwrap_or_default();

        let timeout_secs = match env("REMOTE_TIMEOUT_SECS") {
            Some(raw) => Some(parse_number("REMOTE_TIMEOUT_SECS", &raw)?),
            None => remote.timeout_secs,
        };

        Ok(Self {
            py_mu_pdf_url: non_empty(env("PY_MU_PDF_URL")).or(non_empty(remote.py_mu_pdf_url)),
            pdf_pig_url: non_empty(env("PDF_PIG_URL")).or(non_empty(remote.pdf_pig_url)),
            timeout: timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a positive integer setting.
pub fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: "must be greater than zero".into(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
