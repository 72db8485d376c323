//! Authentication for the Prophy API
//!
//! # Features
//!
//! - **API key**: every request carries `X-ApiKey` via
//!   [`ApiKeyAuthenticator`]
//! - **JWT**: HS256 login tokens and SSO login URLs ([`jwt`])
//! - **OAuth 2.0**: client-credentials, authorization-code (+PKCE) and
//!   refresh grants ([`OAuthClient`])
//! - **PKCE**: RFC 7636 verifier/challenge helpers ([`pkce`])
//! - **Token cache**: AES-256-GCM encrypted in-memory storage
//!   ([`SecureTokenStorage`])
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ ApiKeyAuthenticator  │  X-ApiKey on every API request
//! └──────────────────────┘
//! ┌──────────────────────┐
//! │ JwtIssuer/Validator  │  HS256 sign + verify, login URLs
//! └──────────────────────┘
//! ┌──────────────────────┐
//! │    OAuthClient       │  token endpoint grants
//! └─────────┬────────────┘
//!           ├──► PKCE helpers
//!           └──► TokenStore ◄── SecureTokenStorage
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use prophy_common::auth::{
//!     ClientCredentialsRequest, OAuthClient, OAuthClientConfig, SecureTokenStorage,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), prophy_common::SdkError> {
//! let client = OAuthClient::new(OAuthClientConfig::default())?
//!     .with_token_store(Arc::new(SecureTokenStorage::new()));
//!
//! let request = ClientCredentialsRequest::new(
//!     "https://auth.example.com/oauth/token",
//!     "client-id",
//!     "client-secret",
//! );
//! let token = client
//!     .acquire_client_credentials("reporting", &request, &CancellationToken::new())
//!     .await?;
//! println!("token valid until {}", token.expires_at);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod credentials;
pub mod jwt;
pub mod pkce;
pub mod token_storage;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, DEFAULT_TOKEN_LIFETIME};
pub use credentials::{ApiKeyAuthenticator, Credential, API_KEY_HEADER};
pub use jwt::{
    IssuedToken, JwtIssuer, JwtSettings, JwtValidator, LoginClaims, ResolvedClaims,
    ValidationFailure, ValidationOptions, ValidationOutcome,
};
pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_state, is_valid_code_verifier,
    validate_state, PkceChallenge,
};
pub use token_storage::SecureTokenStorage;
pub use traits::TokenStore;
pub use types::{
    AuthorizationCodeRequest, AuthorizationUrlRequest, ClientCredentialsRequest,
    OAuthClientConfig, OAuthErrorResponse, RefreshTokenRequest, StoredOAuthToken, TokenResponse,
};
