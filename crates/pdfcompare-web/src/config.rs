use std::net::SocketAddr;
use std::str::FromStr;

use pdfcompare_core::config_file::parse_number;
use pdfcompare_core::{ConfigError, ConfigFile, RemoteSettings};

pub const DEFAULT_BIND: &str = "0.0.0.0:5001";
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 100;

/// Which backends this process mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// `POST /pdf-pig` served in-process by MuPDF.
    #[default]
    Local,
    /// `POST /py-mu-pdf` and `POST /pdf-pig` proxied to remote services.
    Gateway,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Local => "local",
            Role::Gateway => "gateway",
        }
    }
}

impl FromStr for Role {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Role::Local),
            "gateway" => Ok(Role::Gateway),
            _ => Err(ConfigError::Invalid {
                key: "role",
                value: s.to_string(),
                reason: "expected `local` or `gateway`".into(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    pub role: Role,
    pub max_upload_mb: u64,
    pub remote: RemoteSettings,
}

impl ServerSettings {
    pub fn from_env(file: &ConfigFile) -> Result<Self, ConfigError> {
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Env vars (`PDFCOMPARE_BIND`, `PDFCOMPARE_ROLE`,
    /// `PDFCOMPARE_MAX_UPLOAD_MB`) win over the `[server]` section.
    pub fn resolve(
        file: &ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let server = file.server.clone().unwrap_or_default();

        let bind_raw = env("PDFCOMPARE_BIND")
            .or(server.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "bind",
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        let role = match env("PDFCOMPARE_ROLE").or(server.role) {
            Some(raw) => raw.parse()?,
            None => Role::default(),
        };

        let max_upload_mb = match env("PDFCOMPARE_MAX_UPLOAD_MB") {
            Some(raw) => parse_number("max_upload_mb", &raw)?,
            None => server.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB),
        };

        Ok(Self {
            bind,
            role,
            max_upload_mb,
            remote: RemoteSettings::resolve(file, &env)?,
        })
    }

    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb as usize).saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfcompare_core::config_file::ServerConfig;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults() {
        let settings = ServerSettings::resolve(&ConfigFile::default(), no_env).unwrap();
        assert_eq!(settings.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(settings.role, Role::Local);
        assert_eq!(settings.max_upload_bytes(), 100 * 1024 * 1024);
    }

    #[test]
    fn env_role_overrides_file() {
        let file = ConfigFile {
            server: Some(ServerConfig {
                role: Some("local".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let env = |key: &str| (key == "PDFCOMPARE_ROLE").then(|| "Gateway".to_string());
        let settings = ServerSettings::resolve(&file, env).unwrap();
        assert_eq!(settings.role, Role::Gateway);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("sidecar".parse::<Role>().is_err());
    }

    #[test]
    fn bad_bind_is_rejected() {
        let env = |key: &str| (key == "PDFCOMPARE_BIND").then(|| "not-an-addr".to_string());
        let err = ServerSettings::resolve(&ConfigFile::default(), env).unwrap_err();
        assert!(err.to_string().contains("bind"));
    }
}
