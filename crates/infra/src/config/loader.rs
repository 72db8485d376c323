//! Configuration loader
//!
//! Loads SDK configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the credentials are not set there, falls back to a config file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PROPHY_API_KEY`: API key (required)
//! - `PROPHY_ORGANIZATION_CODE`: Organization code (required)
//! - `PROPHY_BASE_URL`: API base URL
//! - `PROPHY_TIMEOUT_SECONDS`: Request timeout in seconds
//! - `PROPHY_LOGIN_URL`: JWT login endpoint
//!
//! ## File Locations
//! The loader probes `prophy.toml` and `prophy.json` in the current working
//! directory, its parent and its grandparent, in that order.

use std::path::{Path, PathBuf};

use prophy_domain::{ConfigError, ConfigResult, ProphyConfig};

pub const ENV_API_KEY: &str = "PROPHY_API_KEY";
pub const ENV_ORGANIZATION_CODE: &str = "PROPHY_ORGANIZATION_CODE";
pub const ENV_BASE_URL: &str = "PROPHY_BASE_URL";
pub const ENV_TIMEOUT_SECONDS: &str = "PROPHY_TIMEOUT_SECONDS";
pub const ENV_LOGIN_URL: &str = "PROPHY_LOGIN_URL";

const CONFIG_FILE_NAMES: &[&str] = &["prophy.toml", "prophy.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns a [`ConfigError`] if neither source yields a valid configuration.
pub fn load() -> ConfigResult<ProphyConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `PROPHY_API_KEY` and `PROPHY_ORGANIZATION_CODE` are required; everything
/// else falls back to defaults.
///
/// # Errors
/// `Missing` for absent credentials, `Invalid` for unparseable or
/// out-of-range values.
pub fn load_from_env() -> ConfigResult<ProphyConfig> {
    let mut config = ProphyConfig::new(env_var(ENV_API_KEY)?, env_var(ENV_ORGANIZATION_CODE)?);

    if let Some(base_url) = env_opt(ENV_BASE_URL) {
        config.base_url = base_url;
    }
    if let Some(timeout) = env_opt(ENV_TIMEOUT_SECONDS) {
        config.timeout_seconds = timeout
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::invalid(ENV_TIMEOUT_SECONDS, e.to_string()))?;
    }
    if let Some(login_url) = env_opt(ENV_LOGIN_URL) {
        config.jwt.login_url = login_url;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// `NotFound` when no file exists, `Io`/`Parse` for unreadable or malformed
/// files, and validation errors for incomplete settings.
pub fn load_from_file(path: Option<PathBuf>) -> ConfigResult<ProphyConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.display().to_string()));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConfigError::NotFound("no prophy.toml or prophy.json in standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
        path: config_path.display().to_string(),
        message: e.to_string(),
    })?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> ConfigResult<ProphyConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let parse_error = |message: String| ConfigError::Parse { path: path.display().to_string(), message };

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| parse_error(format!("Invalid TOML format: {e}"))),
        "json" => {
            serde_json::from_str(contents).map_err(|e| parse_error(format!("Invalid JSON format: {e}")))
        }
        _ => Err(parse_error(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe standard paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_from(&cwd)
}

fn probe_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(3)
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Get required environment variable
fn env_var(key: &str) -> ConfigResult<String> {
    env_opt(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

/// Non-empty environment variable, if set
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
