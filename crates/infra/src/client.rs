//! `ProphyClient` facade
//!
//! One client per organization. It owns the shared [`ApiClient`] and
//! hands out the resource APIs and a JWT issuer configured from the same
//! [`ProphyConfig`].

use std::sync::Arc;
use std::time::Duration;

use prophy_common::auth::{JwtIssuer, JwtSettings, LoginClaims, ValidationOptions};
use prophy_common::error::SdkResult;
use prophy_common::time::{SharedClock, SystemClock};
use prophy_domain::ProphyConfig;
use tracing::info;

use crate::api::{ApiClient, AuthorGroupsApi, CustomFieldsApi, JournalsApi, ManuscriptsApi};
use crate::config;
use crate::errors::IntoSdkError;

#[derive(Debug, Clone)]
pub struct ProphyClient {
    config: ProphyConfig,
    manuscripts: ManuscriptsApi,
    journals: JournalsApi,
    author_groups: AuthorGroupsApi,
    custom_fields: CustomFieldsApi,
    jwt_issuer: JwtIssuer,
}

impl ProphyClient {
    /// # Errors
    /// `InvalidArgument` when the configuration does not validate.
    pub fn new(config: ProphyConfig) -> SdkResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Client whose token timestamps and rate-limit hints use `clock`
    pub fn with_clock(config: ProphyConfig, clock: SharedClock) -> SdkResult<Self> {
        let api = Arc::new(ApiClient::with_clock(&config, Arc::clone(&clock))?);
        let settings = JwtSettings {
            login_url: config.jwt.login_url.clone(),
            issuer: config.jwt.issuer.clone(),
            audience: config.jwt.audience.clone(),
        };

        info!(
            organization = %config.organization_code,
            base_url = %api.base_url(),
            "Prophy client initialized"
        );

        Ok(Self {
            manuscripts: ManuscriptsApi::new(Arc::clone(&api)),
            journals: JournalsApi::new(Arc::clone(&api)),
            author_groups: AuthorGroupsApi::new(Arc::clone(&api)),
            custom_fields: CustomFieldsApi::new(api),
            jwt_issuer: JwtIssuer::with_clock(settings, clock),
            config,
        })
    }

    /// Client configured from `PROPHY_*` environment variables
    pub fn from_env() -> SdkResult<Self> {
        Self::new(config::load_from_env().map_err(IntoSdkError::into_sdk)?)
    }

    /// Client configured from the environment, falling back to a config file
    pub fn load() -> SdkResult<Self> {
        Self::new(config::load().map_err(IntoSdkError::into_sdk)?)
    }

    pub fn config(&self) -> &ProphyConfig {
        &self.config
    }

    pub fn organization_code(&self) -> &str {
        &self.config.organization_code
    }

    pub fn manuscripts(&self) -> &ManuscriptsApi {
        &self.manuscripts
    }

    pub fn journals(&self) -> &JournalsApi {
        &self.journals
    }

    pub fn author_groups(&self) -> &AuthorGroupsApi {
        &self.author_groups
    }

    pub fn custom_fields(&self) -> &CustomFieldsApi {
        &self.custom_fields
    }

    pub fn jwt_issuer(&self) -> &JwtIssuer {
        &self.jwt_issuer
    }

    /// Login claims for this organization with the configured lifetime
    pub fn login_claims(&self, subject: impl Into<String>, email: impl Into<String>) -> LoginClaims {
        LoginClaims::new(subject, self.config.organization_code.clone(), email)
            .with_expiration_seconds(self.config.jwt.expiration_seconds)
    }

    /// Validation options matching tokens this client issues
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions::default()
            .with_issuer(self.config.jwt.issuer.clone())
            .with_audience(self.config.jwt.audience.clone())
            .with_required_organization(self.config.organization_code.clone())
            .with_clock_skew(Duration::from_secs(self.config.jwt.clock_skew_seconds))
    }
}

#[cfg(test)]
mod tests {
    use prophy_common::auth::JwtValidator;
    use prophy_common::time::MockClock;
    use prophy_common::ErrorCategory;

    use super::*;

    #[test]
    fn rejects_invalid_config() {
        let err = ProphyClient::new(ProphyConfig::new("k", "")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    }

    #[test]
    fn issued_login_tokens_validate_with_client_options() {
        let clock = MockClock::new();
        let client = ProphyClient::with_clock(ProphyConfig::new("k", "acme"), Arc::new(clock.clone())).unwrap();
        let secret = "acme-signing-secret-0123456789abcdef";

        let issued = client.jwt_issuer().issue(&client.login_claims("u-1", "u1@acme.org"), secret).unwrap();
        let outcome = JwtValidator::with_clock(Arc::new(clock)).validate(
            &issued.token,
            secret,
            &client.validation_options(),
        );

        assert!(outcome.is_valid, "{:?}", outcome.failure_reason);
        let claims = outcome.claims.unwrap();
        assert_eq!(claims.organization().as_deref(), Some("acme"));
    }

    #[test]
    fn jwt_settings_follow_config() {
        let mut config = ProphyConfig::new("k", "acme");
        config.jwt.login_url = "https://sso.example.org/login".into();
        config.jwt.expiration_seconds = 120;
        let client = ProphyClient::new(config).unwrap();

        assert_eq!(client.jwt_issuer().settings().login_url, "https://sso.example.org/login");
        assert_eq!(client.login_claims("s", "e@x.org").expiration_seconds, 120);
        assert_eq!(client.organization_code(), "acme");
    }
}
