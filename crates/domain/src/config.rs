//! SDK configuration
//!
//! Every default the SDK relies on (base URL, login URL, JWT issuer and
//! audience, timeouts) is an explicit field here so tests and tenants can
//! override it without touching the environment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CLOCK_SKEW_SECONDS, DEFAULT_JWT_AUDIENCE,
    DEFAULT_JWT_EXPIRATION_SECONDS, DEFAULT_JWT_ISSUER, DEFAULT_LOGIN_URL,
    DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT,
};
use crate::errors::{ConfigError, ConfigResult};

/// Client configuration for one organization
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProphyConfig {
    pub api_key: String,
    pub organization_code: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub jwt: JwtConfig,
}

/// JWT login settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub login_url: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_seconds: i64,
    pub clock_skew_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            issuer: DEFAULT_JWT_ISSUER.to_string(),
            audience: DEFAULT_JWT_AUDIENCE.to_string(),
            expiration_seconds: DEFAULT_JWT_EXPIRATION_SECONDS,
            clock_skew_seconds: DEFAULT_CLOCK_SKEW_SECONDS,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ProphyConfig {
    /// Configuration with defaults for everything but the credentials
    pub fn new(api_key: impl Into<String>, organization_code: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            organization_code: organization_code.into(),
            base_url: default_base_url(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: default_user_agent(),
            jwt: JwtConfig::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_jwt(mut self, jwt: JwtConfig) -> Self {
        self.jwt = jwt;
        self
    }

    /// Base URL guaranteed to end with `/`
    pub fn normalized_base_url(&self) -> String {
        let trimmed = self.base_url.trim();
        if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        }
    }

    /// Check that the configuration is usable
    ///
    /// # Errors
    /// `Missing` for empty credentials, `Invalid` for malformed URLs or
    /// non-positive durations.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("api_key".to_string()));
        }
        if self.organization_code.trim().is_empty() {
            return Err(ConfigError::Missing("organization_code".to_string()));
        }
        require_http_url("base_url", &self.base_url)?;
        if self.timeout_seconds == 0 {
            return Err(ConfigError::invalid("timeout_seconds", "must be greater than zero"));
        }
        self.jwt.validate()
    }
}

impl fmt::Debug for ProphyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProphyConfig")
            .field("api_key", &"[REDACTED]")
            .field("organization_code", &self.organization_code)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("user_agent", &self.user_agent)
            .field("jwt", &self.jwt)
            .finish()
    }
}

impl JwtConfig {
    /// # Errors
    /// `Invalid` for a malformed login URL, empty issuer/audience or a
    /// non-positive lifetime.
    pub fn validate(&self) -> ConfigResult<()> {
        require_http_url("jwt.login_url", &self.login_url)?;
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::invalid("jwt.issuer", "must not be empty"));
        }
        if self.audience.trim().is_empty() {
            return Err(ConfigError::invalid("jwt.audience", "must not be empty"));
        }
        if self.expiration_seconds <= 0 {
            return Err(ConfigError::invalid("jwt.expiration_seconds", "must be positive"));
        }
        Ok(())
    }
}

fn require_http_url(field: &str, value: &str) -> ConfigResult<()> {
    let value = value.trim();
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .ok_or_else(|| ConfigError::invalid(field, "must start with http:// or https://"))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ConfigError::invalid(field, "must include a host"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_platform() {
        let config = ProphyConfig::new("key", "org");
        assert_eq!(config.base_url, "https://www.prophy.ai/api/");
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.jwt.login_url, "https://www.prophy.ai/api/auth/api-jwt-login/");
        assert_eq!(config.jwt.issuer, "Prophy");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ProphyConfig = toml::from_str(
            r#"
            api_key = "k"
            organization_code = "acme"

            [jwt]
            issuer = "Acme"
            "#,
        )
        .unwrap();

        assert_eq!(config.jwt.issuer, "Acme");
        assert_eq!(config.jwt.audience, "Prophy");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn validate_reports_field() {
        assert_eq!(
            ProphyConfig::new(" ", "org").validate().unwrap_err(),
            ConfigError::Missing("api_key".into())
        );
        let err = ProphyConfig::new("k", "org").with_base_url("ftp://x").validate().unwrap_err();
        assert_eq!(err.field(), Some("base_url"));

        let err = ProphyConfig::new("k", "org").with_timeout_seconds(0).validate().unwrap_err();
        assert_eq!(err.field(), Some("timeout_seconds"));

        let jwt = JwtConfig { expiration_seconds: 0, ..JwtConfig::default() };
        let err = ProphyConfig::new("k", "org").with_jwt(jwt).validate().unwrap_err();
        assert_eq!(err.field(), Some("jwt.expiration_seconds"));
    }

    #[test]
    fn base_url_normalization() {
        let config = ProphyConfig::new("k", "o").with_base_url("http://localhost:8080/api");
        assert_eq!(config.normalized_base_url(), "http://localhost:8080/api/");
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", ProphyConfig::new("very-secret", "org"));
        assert!(!rendered.contains("very-secret"));
    }
}
