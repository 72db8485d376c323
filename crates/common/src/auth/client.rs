//! OAuth 2.0 client for token endpoint grant flows
//!
//! Supports three grants, each posted as
//! `application/x-www-form-urlencoded` to a caller-supplied token endpoint:
//! - client credentials
//! - authorization code (optionally with a PKCE verifier and, for
//!   confidential clients, a client secret)
//! - refresh token
//!
//! Parameters are validated before any request is sent. Error responses
//! carrying an RFC 6749 `error` field become `Authentication` errors with
//! that code; other failures go through [`ErrorClassifier`]. The client
//! never retries.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::pkce::CHALLENGE_METHOD;
use super::traits::TokenStore;
use super::types::{
    AuthorizationCodeRequest, AuthorizationUrlRequest, ClientCredentialsRequest,
    OAuthClientConfig, OAuthErrorResponse, RefreshTokenRequest, StoredOAuthToken, TokenResponse,
};
use crate::cancel::run_cancellable;
use crate::error::{ErrorClassifier, ResponseContext, SdkError, SdkResult};
use crate::time::{shared, SharedClock, SystemClock};

/// Lifetime assumed for tokens returned without `expires_in`
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// OAuth 2.0 token endpoint client
#[derive(Clone)]
pub struct OAuthClient {
    http: Client,
    config: OAuthClientConfig,
    classifier: ErrorClassifier,
    clock: SharedClock,
    store: Option<Arc<dyn TokenStore>>,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("config", &self.config)
            .field("has_token_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Create a client with its own HTTP connection pool
    ///
    /// # Errors
    /// `Transport` if the underlying HTTP client cannot be built.
    pub fn new(config: OAuthClientConfig) -> SdkResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SdkError::transport(format!("Failed to build HTTP client: {e}")))?;
        let clock = shared(SystemClock);

        Ok(Self { http, config, classifier: ErrorClassifier::new(Arc::clone(&clock)), clock, store: None })
    }

    /// Read time from `clock` (token expiry and retry-after)
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.classifier = ErrorClassifier::new(Arc::clone(&clock));
        self.clock = clock;
        self
    }

    /// Cache acquired tokens in `store`
    #[must_use]
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Configuration the client was built with
    pub fn config(&self) -> &OAuthClientConfig {
        &self.config
    }

    /// Client-credentials grant
    ///
    /// # Errors
    /// `InvalidArgument` before any I/O for missing parameters; otherwise
    /// the classified failure of the token request.
    #[instrument(skip(self, request, cancel), fields(endpoint = %request.token_endpoint, client_id = %request.client_id))]
    pub async fn client_credentials(
        &self,
        request: &ClientCredentialsRequest,
        cancel: &CancellationToken,
    ) -> SdkResult<TokenResponse> {
        request.validate()?;
        self.post_form(&request.token_endpoint, &request.form(), cancel).await
    }

    /// Authorization-code grant
    ///
    /// # Errors
    /// Same as [`OAuthClient::client_credentials`].
    #[instrument(skip(self, request, cancel), fields(endpoint = %request.token_endpoint, client_id = %request.client_id))]
    pub async fn exchange_authorization_code(
        &self,
        request: &AuthorizationCodeRequest,
        cancel: &CancellationToken,
    ) -> SdkResult<TokenResponse> {
        request.validate()?;
        self.post_form(&request.token_endpoint, &request.form(), cancel).await
    }

    /// Refresh-token grant
    ///
    /// # Errors
    /// Same as [`OAuthClient::client_credentials`].
    #[instrument(skip(self, request, cancel), fields(endpoint = %request.token_endpoint, client_id = %request.client_id))]
    pub async fn refresh_token(
        &self,
        request: &RefreshTokenRequest,
        cancel: &CancellationToken,
    ) -> SdkResult<TokenResponse> {
        request.validate()?;
        self.post_form(&request.token_endpoint, &request.form(), cancel).await
    }

    /// Return a cached client-credentials token, fetching a new one when the
    /// cached token is missing or expires within the refresh threshold
    ///
    /// # Errors
    /// `InvalidOperation` when no token store is configured, plus any error
    /// of [`OAuthClient::client_credentials`].
    pub async fn acquire_client_credentials(
        &self,
        cache_key: &str,
        request: &ClientCredentialsRequest,
        cancel: &CancellationToken,
    ) -> SdkResult<StoredOAuthToken> {
        SdkError::require_non_empty("cache_key", cache_key)?;
        let store = self.store.as_ref().ok_or_else(|| {
            SdkError::invalid_operation("No token store configured for cached acquisition")
        })?;

        if !store.needs_refresh(cache_key, self.config.refresh_threshold).await {
            if let Some(cached) = store.fetch(cache_key).await? {
                debug!(cache_key, "using cached access token");
                return Ok(cached);
            }
        }

        let response = self.client_credentials(request, cancel).await?;
        let stored = response.to_stored(self.clock.now(), DEFAULT_TOKEN_LIFETIME);
        store.put(cache_key, &stored).await?;
        info!(cache_key, expires_at = %stored.expires_at, "acquired client-credentials token");
        Ok(stored)
    }

    /// Assemble the browser redirect for the authorization-code flow
    ///
    /// Adds `response_type=code`, `client_id`, `redirect_uri` and, when set,
    /// `scope`, `state`, `code_challenge` with `code_challenge_method=S256`.
    /// Values are percent-encoded. Parameters are appended with `&` when the
    /// endpoint already has a query string.
    ///
    /// # Errors
    /// `InvalidArgument` for missing parameters or a non-absolute endpoint.
    pub fn build_authorization_url(&self, request: &AuthorizationUrlRequest) -> SdkResult<String> {
        request.validate()?;
        let endpoint = request.authorization_endpoint.trim();
        Url::parse(endpoint).map_err(|e| {
            SdkError::invalid_argument("authorization_endpoint", format!("not an absolute URL: {e}"))
        })?;

        let mut params: Vec<(&str, &str)> = vec![
            ("response_type", "code"),
            ("client_id", request.client_id.as_str()),
            ("redirect_uri", request.redirect_uri.as_str()),
        ];
        let optional = [
            ("scope", request.scope.as_deref()),
            ("state", request.state.as_deref()),
            ("code_challenge", request.code_challenge.as_deref()),
        ];
        params.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| (name, v))),
        );
        if request.code_challenge.as_deref().is_some_and(|c| !c.is_empty()) {
            params.push(("code_challenge_method", CHALLENGE_METHOD));
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if endpoint.ends_with('?') || endpoint.ends_with('&') {
            ""
        } else if endpoint.contains('?') {
            "&"
        } else {
            "?"
        };
        Ok(format!("{endpoint}{separator}{query}"))
    }

    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&'static str, String)],
        cancel: &CancellationToken,
    ) -> SdkResult<TokenResponse> {
        let timeout = self.config.timeout;
        let exchange = async {
            let response = self
                .http
                .post(endpoint)
                .form(form)
                .send()
                .await
                .map_err(|e| SdkError::from_reqwest(&e, timeout))?;
            let status = response.status();
            let body = response.text().await.map_err(|e| SdkError::from_reqwest(&e, timeout))?;
            Ok((status, body))
        };
        let (status, body) = run_cancellable(cancel, exchange).await?;
        debug!(%status, "token endpoint responded");

        if !status.is_success() {
            let error = self.map_error(status.as_u16(), &body);
            warn!(status = status.as_u16(), code = error.error_code(), "token request failed");
            return Err(error);
        }

        // The body may hold live tokens; keep only the error position
        serde_json::from_str::<TokenResponse>(&body).map_err(|e| {
            SdkError::serialization::<TokenResponse>(
                format!("{:?} error at line {} column {}", e.classify(), e.line(), e.column()),
                None,
            )
        })
    }

    fn map_error(&self, status: u16, body: &str) -> SdkError {
        match serde_json::from_str::<OAuthErrorResponse>(body) {
            Ok(oauth) => SdkError::Authentication {
                message: format!("OAuth token request failed: {oauth}"),
                code: oauth.error,
                context: ResponseContext::status(status).with_details(oauth.error_uri),
            },
            Err(_) => self.classifier.classify(status, Some(body), None),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::client.
    use super::*;
    use crate::auth::pkce::PkceChallenge;
    use crate::error::ErrorCategory;

    fn client() -> OAuthClient {
        OAuthClient::new(OAuthClientConfig::default()).unwrap()
    }

    /// Validates `OAuthClient::build_authorization_url` behavior for the PKCE
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `response_type=code` and `code_challenge_method=S256` are
    ///   present.
    /// - Ensures values are percent-encoded.
    #[test]
    fn test_authorization_url_with_pkce() {
        let pkce = PkceChallenge::generate();
        let request = AuthorizationUrlRequest::new(
            "https://auth.example.com/authorize",
            "client 1",
            "http://localhost:8080/callback",
        )
        .with_scope("openid profile")
        .with_state(pkce.state.clone())
        .with_code_challenge(pkce.code_challenge.clone());

        let url = client().build_authorization_url(&request).unwrap();

        assert!(url.starts_with("https://auth.example.com/authorize?response_type=code&"));
        assert!(url.contains("client_id=client%201"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcallback"));
        assert!(url.contains("scope=openid%20profile"));
        assert!(url.contains(&format!("code_challenge={}", pkce.code_challenge)));
        assert!(url.ends_with("code_challenge_method=S256"));
    }

    #[test]
    fn test_authorization_url_appends_to_existing_query() {
        let request = AuthorizationUrlRequest::new(
            "https://auth.example.com/authorize?tenant=acme",
            "client",
            "https://app/cb",
        );
        let url = client().build_authorization_url(&request).unwrap();

        assert!(url.starts_with("https://auth.example.com/authorize?tenant=acme&response_type=code"));
        assert!(!url.contains("code_challenge"));
        assert!(!url.contains("scope="));
    }

    #[test]
    fn test_authorization_url_requires_absolute_endpoint() {
        let request = AuthorizationUrlRequest::new("/authorize", "client", "https://app/cb");
        let err = client().build_authorization_url(&request).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    }

    #[test]
    fn test_oauth_error_body_maps_to_authentication() {
        let err = client().map_error(400, r#"{"error":"invalid_client","error_description":"bad secret"}"#);
        assert_eq!(err.category(), ErrorCategory::Authentication);
        assert_eq!(err.error_code(), "invalid_client");
        assert_eq!(err.http_status(), Some(400));
        assert!(err.to_string().contains("bad secret"));
    }

    #[test]
    fn test_non_oauth_body_is_classified() {
        let err = client().map_error(503, "<html>down</html>");
        assert_eq!(err.error_code(), "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_validation_happens_before_io() {
        let cancel = CancellationToken::new();
        let request = ClientCredentialsRequest::new("http://127.0.0.1:1/token", "", "secret");

        let err = client().client_credentials(&request, &cancel).await.unwrap_err();
        assert!(matches!(err, SdkError::InvalidArgument { ref parameter, .. } if parameter == "client_id"));
    }

    #[tokio::test]
    async fn test_acquire_requires_store() {
        let request = ClientCredentialsRequest::new("http://127.0.0.1:1/token", "id", "secret");
        let err = client()
            .acquire_client_credentials("svc", &request, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidOperation);
    }
}
