//! Configuration loading for the server binary.
//!
//! Sources, later ones winning:
//!
//! 1. `ApiConfig::default()`
//! 2. JSON file passed with `--config`
//! 3. `INCIDENT_*` environment variables
//!
//! Validation is left to the consumer: `serve` validates the whole config,
//! `seed` only needs the store section.

use anyhow::{Context, Result};
use incident_api::{ApiConfig, StoreBackend};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ENV_HTTP_PORT: &str = "INCIDENT_HTTP_PORT";
pub const ENV_STORE: &str = "INCIDENT_STORE";
pub const ENV_SQLITE_PATH: &str = "INCIDENT_SQLITE_PATH";
pub const ENV_SESSION_TOKENS: &str = "INCIDENT_SESSION_TOKENS";
pub const ENV_TRUSTED_USER_HEADER: &str = "INCIDENT_TRUSTED_USER_HEADER";

/// An environment variable that was set but could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{var}={value:?}: {reason}")]
pub struct OverrideError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

impl OverrideError {
    fn new(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Load the configuration from an optional file and the process environment.
pub fn load_config(path: Option<&Path>) -> Result<ApiConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => ApiConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())
        .context("invalid environment override")?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<ApiConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    info!(path = %path.display(), "Loaded configuration file");
    Ok(config)
}

/// Apply `INCIDENT_*` overrides, reading variables through `lookup`.
///
/// `INCIDENT_SESSION_TOKENS` replaces the whole session table and takes the
/// form `token:user[,token:user...]`.
pub fn apply_env_overrides<F>(config: &mut ApiConfig, lookup: F) -> Result<(), OverrideError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(ENV_HTTP_PORT) {
        config.http.port = port
            .trim()
            .parse()
            .map_err(|e| OverrideError::new(ENV_HTTP_PORT, &port, format!("{e}")))?;
    }

    if let Some(backend) = lookup(ENV_STORE) {
        config.store.backend = backend
            .parse::<StoreBackend>()
            .map_err(|e| OverrideError::new(ENV_STORE, &backend, e.to_string()))?;
    }

    if let Some(path) = lookup(ENV_SQLITE_PATH) {
        if path.trim().is_empty() {
            return Err(OverrideError::new(ENV_SQLITE_PATH, &path, "path is empty"));
        }
        config.store.sqlite_path = Some(PathBuf::from(path));
    }

    if let Some(tokens) = lookup(ENV_SESSION_TOKENS) {
        config.identity.sessions = parse_session_tokens(&tokens)?;
    }

    if let Some(header) = lookup(ENV_TRUSTED_USER_HEADER) {
        let header = header.trim();
        config.identity.trusted_user_header = (!header.is_empty()).then(|| header.to_string());
    }

    Ok(())
}

fn parse_session_tokens(raw: &str) -> Result<BTreeMap<String, String>, OverrideError> {
    let mut sessions = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((token, user)) = entry.split_once(':') else {
            return Err(OverrideError::new(
                ENV_SESSION_TOKENS,
                raw,
                format!("entry {entry:?} is not token:user"),
            ));
        };
        let (token, user) = (token.trim(), user.trim());
        if token.is_empty() || user.is_empty() {
            return Err(OverrideError::new(
                ENV_SESSION_TOKENS,
                raw,
                format!("entry {entry:?} has an empty token or user"),
            ));
        }
        sessions.insert(token.to_string(), user.to_string());
    }
    Ok(sessions)
}
