//! API-key credentials and request authentication
//!
//! Every authenticated API request carries the organization's key in the
//! `X-ApiKey` header. The organization code travels alongside the key but
//! is surfaced by callers separately (for example in URL paths or JWT
//! claims); it is never sent as a header here.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::RequestBuilder;
use tracing::debug;

use crate::error::{SdkError, SdkResult};

/// Header carrying the raw API key
pub const API_KEY_HEADER: &str = "X-ApiKey";

/// Organization API credential
///
/// Immutable once constructed. `Debug` output never includes the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    api_key: String,
    organization_code: String,
}

impl Credential {
    /// Create a credential
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the API key is empty.
    pub fn new(api_key: impl Into<String>, organization_code: impl Into<String>) -> SdkResult<Self> {
        let api_key = api_key.into();
        SdkError::require_non_empty("api_key", &api_key)?;
        Ok(Self { api_key, organization_code: organization_code.into() })
    }

    /// Raw API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Organization code
    pub fn organization_code(&self) -> &str {
        &self.organization_code
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"[REDACTED]")
            .field("organization_code", &self.organization_code)
            .finish()
    }
}

/// Attaches the `X-ApiKey` header to outbound requests
#[derive(Debug, Clone, Default)]
pub struct ApiKeyAuthenticator {
    credential: Option<Credential>,
}

impl ApiKeyAuthenticator {
    /// Authenticator for the given credential
    pub fn new(credential: Credential) -> Self {
        Self { credential: Some(credential) }
    }

    /// Authenticator without a key; every attach fails
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Whether a key has been configured
    pub fn is_configured(&self) -> bool {
        self.credential.is_some()
    }

    /// Organization code of the configured credential
    pub fn organization_code(&self) -> Option<&str> {
        self.credential.as_ref().map(Credential::organization_code)
    }

    /// Insert the API key header into `headers`
    ///
    /// # Errors
    /// Returns `InvalidOperation` when no key is configured and
    /// `InvalidArgument` when the key is not a valid header value.
    pub fn apply(&self, headers: &mut HeaderMap) -> SdkResult<()> {
        headers.insert(API_KEY_HEADER, self.header_value()?);
        Ok(())
    }

    /// Attach the API key header to a request
    ///
    /// # Errors
    /// Same as [`ApiKeyAuthenticator::apply`].
    pub fn attach(&self, request: RequestBuilder) -> SdkResult<RequestBuilder> {
        Ok(request.header(API_KEY_HEADER, self.header_value()?))
    }

    fn header_value(&self) -> SdkResult<HeaderValue> {
        let credential = self.credential.as_ref().ok_or_else(|| {
            SdkError::invalid_operation("No API key configured; cannot authenticate request")
        })?;

        let mut value = HeaderValue::from_str(credential.api_key())
            .map_err(|_| SdkError::invalid_argument("api_key", "contains invalid header characters"))?;
        value.set_sensitive(true);

        debug!(organization = %credential.organization_code(), "attaching API key header");
        Ok(value)
    }
}
