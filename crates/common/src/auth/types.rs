//! OAuth 2.0 types and structures
//!
//! Token payloads (RFC 6749 §5.1/§5.2), the cached token shape, client
//! configuration and the per-grant request types. Requests validate their
//! required parameters eagerly so no network call is made with an empty
//! endpoint, client id, secret, code or redirect URI.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Default timeout for token endpoint calls
pub const DEFAULT_OAUTH_TIMEOUT: Duration = Duration::from_secs(30);

/// Token response from an authorization server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token to send on API calls
    pub access_token: String,
    /// Token type, `Bearer` when absent
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds from issuance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Token for the refresh grant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Granted scope, space separated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// OpenID Connect ID token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("scope", &self.scope)
            .finish()
    }
}

impl TokenResponse {
    /// Convert to the cached representation, anchoring `expires_in` at
    /// `issued_at`
    ///
    /// Tokens without `expires_in` are treated as already expiring at
    /// `issued_at + fallback`. Lifetimes past the representable range clamp
    /// to the latest representable instant.
    #[must_use]
    pub fn to_stored(&self, issued_at: DateTime<Utc>, fallback: Duration) -> StoredOAuthToken {
        let lifetime = match self.expires_in {
            Some(secs) => chrono::Duration::try_seconds(secs.max(0)),
            None => chrono::Duration::from_std(fallback).ok(),
        };
        let expires_at = lifetime
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        StoredOAuthToken {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at,
            scope: self.scope.clone(),
        }
    }
}

/// Token cached by [`SecureTokenStorage`](super::SecureTokenStorage)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOAuthToken {
    /// Bearer token
    pub access_token: String,
    /// Token for the refresh grant
    pub refresh_token: Option<String>,
    /// Instant after which the token is never returned
    pub expires_at: DateTime<Utc>,
    /// Granted scope
    pub scope: Option<String>,
}

impl fmt::Debug for StoredOAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredOAuthToken")
            .field("access_token", &"[REDACTED]")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

impl StoredOAuthToken {
    /// Whether the token has expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the token expires within `threshold` of `now`
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        match chrono::Duration::from_std(threshold) {
            Ok(threshold) => {
                now.checked_add_signed(threshold).map_or(true, |limit| self.expires_at <= limit)
            }
            Err(_) => true,
        }
    }
}

/// OAuth error response (RFC 6749 §5.2)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthErrorResponse {
    /// RFC 6749 error code, e.g. `invalid_grant`
    pub error: String,
    /// Human-readable description
    pub error_description: Option<String>,
    /// Page describing the error
    pub error_uri: Option<String>,
}

impl fmt::Display for OAuthErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Transport settings for [`OAuthClient`](super::OAuthClient)
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// `User-Agent` header value
    pub user_agent: String,
    /// Cached tokens expiring within this window are re-acquired
    pub refresh_threshold: Duration,
}

impl Default for OAuthClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_OAUTH_TIMEOUT,
            user_agent: concat!("prophy-sdk-rust/", env!("CARGO_PKG_VERSION")).to_string(),
            refresh_threshold: Duration::from_secs(300),
        }
    }
}

impl OAuthClientConfig {
    /// Per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `User-Agent` header value
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// How close to expiry a cached token is refreshed
    #[must_use]
    pub fn with_refresh_threshold(mut self, threshold: Duration) -> Self {
        self.refresh_threshold = threshold;
        self
    }
}

/// Client-credentials grant (RFC 6749 §4.4)
#[derive(Clone)]
pub struct ClientCredentialsRequest {
    /// Token endpoint URL
    pub token_endpoint: String,
    /// OAuth client identifier
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Requested scope
    pub scope: Option<String>,
}

impl ClientCredentialsRequest {
    /// Request without a scope
    pub fn new(
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: None,
        }
    }

    /// Request a scope
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub(crate) fn validate(&self) -> SdkResult<()> {
        SdkError::require_non_empty("token_endpoint", &self.token_endpoint)?;
        SdkError::require_non_empty("client_id", &self.client_id)?;
        SdkError::require_non_empty("client_secret", &self.client_secret)
    }

    pub(crate) fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
        ];
        push_optional(&mut form, "scope", self.scope.as_deref());
        form
    }
}

impl fmt::Debug for ClientCredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsRequest")
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Authorization-code grant (RFC 6749 §4.1.3), optionally with PKCE
///
/// Public clients send `code_verifier`; confidential clients may add a
/// `client_secret`.
#[derive(Clone)]
pub struct AuthorizationCodeRequest {
    /// Token endpoint URL
    pub token_endpoint: String,
    /// OAuth client identifier
    pub client_id: String,
    /// Authorization code from the redirect
    pub code: String,
    /// Redirect URI used in the authorization request
    pub redirect_uri: String,
    /// PKCE verifier matching the sent challenge
    pub code_verifier: Option<String>,
    /// Secret for confidential clients
    pub client_secret: Option<String>,
    /// State echoed back by the server
    pub state: Option<String>,
}

impl AuthorizationCodeRequest {
    /// Public-client request without PKCE
    pub fn new(
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        code: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            code: code.into(),
            redirect_uri: redirect_uri.into(),
            code_verifier: None,
            client_secret: None,
            state: None,
        }
    }

    /// Attach the PKCE verifier
    #[must_use]
    pub fn with_code_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.code_verifier = Some(verifier.into());
        self
    }

    /// Authenticate as a confidential client
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Send the `state` value
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub(crate) fn validate(&self) -> SdkResult<()> {
        SdkError::require_non_empty("token_endpoint", &self.token_endpoint)?;
        SdkError::require_non_empty("client_id", &self.client_id)?;
        SdkError::require_non_empty("code", &self.code)?;
        SdkError::require_non_empty("redirect_uri", &self.redirect_uri)?;
        if let Some(verifier) = &self.code_verifier {
            if !super::pkce::is_valid_code_verifier(verifier) {
                return Err(SdkError::invalid_argument(
                    "code_verifier",
                    "must be 43-128 unreserved characters",
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("client_id", self.client_id.clone()),
            ("code", self.code.clone()),
            ("redirect_uri", self.redirect_uri.clone()),
        ];
        push_optional(&mut form, "code_verifier", self.code_verifier.as_deref());
        push_optional(&mut form, "client_secret", self.client_secret.as_deref());
        push_optional(&mut form, "state", self.state.as_deref());
        form
    }
}

impl fmt::Debug for AuthorizationCodeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationCodeRequest")
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("has_code_verifier", &self.code_verifier.is_some())
            .field("has_client_secret", &self.client_secret.is_some())
            .finish_non_exhaustive()
    }
}

/// Refresh-token grant (RFC 6749 §6)
#[derive(Clone)]
pub struct RefreshTokenRequest {
    /// Token endpoint URL
    pub token_endpoint: String,
    /// OAuth client identifier
    pub client_id: String,
    /// Refresh token to redeem
    pub refresh_token: String,
    /// Secret for confidential clients
    pub client_secret: Option<String>,
    /// Narrowed scope
    pub scope: Option<String>,
}

impl RefreshTokenRequest {
    /// Refresh request for a public client
    pub fn new(
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            refresh_token: refresh_token.into(),
            client_secret: None,
            scope: None,
        }
    }

    /// Authenticate as a confidential client
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Request a narrower scope
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub(crate) fn validate(&self) -> SdkResult<()> {
        SdkError::require_non_empty("token_endpoint", &self.token_endpoint)?;
        SdkError::require_non_empty("client_id", &self.client_id)?;
        SdkError::require_non_empty("refresh_token", &self.refresh_token)
    }

    pub(crate) fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("client_id", self.client_id.clone()),
            ("refresh_token", self.refresh_token.clone()),
        ];
        push_optional(&mut form, "client_secret", self.client_secret.as_deref());
        push_optional(&mut form, "scope", self.scope.as_deref());
        form
    }
}

impl fmt::Debug for RefreshTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRequest")
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("refresh_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Parameters for a browser authorization redirect
#[derive(Debug, Clone, Default)]
pub struct AuthorizationUrlRequest {
    /// Authorization endpoint URL
    pub authorization_endpoint: String,
    /// OAuth client identifier
    pub client_id: String,
    /// Where the server redirects back
    pub redirect_uri: String,
    /// Requested scope
    pub scope: Option<String>,
    /// Opaque anti-CSRF value
    pub state: Option<String>,
    /// Pre-computed S256 challenge
    pub code_challenge: Option<String>,
}

impl AuthorizationUrlRequest {
    /// Redirect parameters without scope, state or PKCE
    pub fn new(
        authorization_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            authorization_endpoint: authorization_endpoint.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            ..Self::default()
        }
    }

    /// Request a scope
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Send an anti-CSRF state
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Attach an S256 PKCE challenge
    #[must_use]
    pub fn with_code_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.code_challenge = Some(challenge.into());
        self
    }

    pub(crate) fn validate(&self) -> SdkResult<()> {
        SdkError::require_non_empty("authorization_endpoint", &self.authorization_endpoint)?;
        SdkError::require_non_empty("client_id", &self.client_id)?;
        SdkError::require_non_empty("redirect_uri", &self.redirect_uri)
    }
}

fn push_optional(form: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        form.push((name, value.to_string()));
    }
}
