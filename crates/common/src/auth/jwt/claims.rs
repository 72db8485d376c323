//! Login claims, issuer settings and the signed claim set

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Platform login endpoint that accepts `?token=<jwt>`
pub const DEFAULT_LOGIN_URL: &str = "https://www.prophy.ai/api/auth/api-jwt-login/";

/// Default `iss` claim
pub const DEFAULT_ISSUER: &str = "Prophy";

/// Default `aud` claim
pub const DEFAULT_AUDIENCE: &str = "Prophy";

/// Default token lifetime in seconds
pub const DEFAULT_EXPIRATION_SECONDS: i64 = 3600;

/// Issuer-wide settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtSettings {
    /// Base URL used by [`JwtIssuer::issue_login_url`](super::JwtIssuer::issue_login_url)
    pub login_url: String,
    /// `iss` used when the claims do not override it
    pub issuer: String,
    /// `aud` used when the claims do not override it
    pub audience: String,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }
}

/// Claims for a single SSO login
///
/// `subject`, `organization` and `email` are required. Optional fields are
/// emitted only when non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginClaims {
    /// `sub` claim
    pub subject: String,
    /// `organization` claim
    pub organization: String,
    /// `email` claim
    pub email: String,
    /// Target folder
    #[serde(default)]
    pub folder: Option<String>,
    /// Caller-side record id
    #[serde(default)]
    pub origin_id: Option<String>,
    /// Given name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default)]
    pub last_name: Option<String>,
    /// `name` claim
    #[serde(default)]
    pub display_name: Option<String>,
    /// Role within the organization
    #[serde(default)]
    pub role: Option<String>,
    /// Token lifetime, must be positive
    #[serde(default = "default_expiration")]
    pub expiration_seconds: i64,
    /// Overrides [`JwtSettings::issuer`]
    #[serde(default)]
    pub issuer: Option<String>,
    /// Overrides [`JwtSettings::audience`]
    #[serde(default)]
    pub audience: Option<String>,
}

fn default_expiration() -> i64 {
    DEFAULT_EXPIRATION_SECONDS
}

impl LoginClaims {
    /// Claims with the required fields and a one hour lifetime
    pub fn new(
        subject: impl Into<String>,
        organization: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            organization: organization.into(),
            email: email.into(),
            folder: None,
            origin_id: None,
            first_name: None,
            last_name: None,
            display_name: None,
            role: None,
            expiration_seconds: DEFAULT_EXPIRATION_SECONDS,
            issuer: None,
            audience: None,
        }
    }

    /// Set the target folder
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// Set the caller-side record id
    #[must_use]
    pub fn with_origin_id(mut self, origin_id: impl Into<String>) -> Self {
        self.origin_id = Some(origin_id.into());
        self
    }

    /// Set given and family names
    #[must_use]
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    /// Set the `name` claim
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Set the role
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the lifetime in seconds
    #[must_use]
    pub fn with_expiration_seconds(mut self, seconds: i64) -> Self {
        self.expiration_seconds = seconds;
        self
    }

    /// Override the configured issuer
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Override the configured audience
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Check required fields and the lifetime
    ///
    /// # Errors
    /// `InvalidArgument` naming the first offending field.
    pub fn validate(&self) -> SdkResult<()> {
        SdkError::require_non_empty("subject", &self.subject)?;
        SdkError::require_non_empty("organization", &self.organization)?;
        SdkError::require_non_empty("email", &self.email)?;
        if self.expiration_seconds <= 0 {
            return Err(SdkError::invalid_argument(
                "expiration_seconds",
                format!("must be positive, got {}", self.expiration_seconds),
            ));
        }
        Ok(())
    }
}

/// Signed JWT and its expiration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact JWS
    pub token: String,
    /// Value of the `exp` claim
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Token as a string slice
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

/// Wire claim set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenClaims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl TokenClaims {
    pub(crate) fn build(
        claims: &LoginClaims,
        settings: &JwtSettings,
        issued_at: i64,
        jti: String,
    ) -> Self {
        Self {
            sub: claims.subject.clone(),
            email: claims.email.clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(claims.expiration_seconds),
            jti,
            iss: non_empty(&claims.issuer).unwrap_or_else(|| settings.issuer.clone()),
            aud: non_empty(&claims.audience).unwrap_or_else(|| settings.audience.clone()),
            organization: claims.organization.clone(),
            folder: non_empty(&claims.folder),
            origin_id: non_empty(&claims.origin_id),
            first_name: non_empty(&claims.first_name),
            last_name: non_empty(&claims.last_name),
            name: non_empty(&claims.display_name),
            role: non_empty(&claims.role),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
