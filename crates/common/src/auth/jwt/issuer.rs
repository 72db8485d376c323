//! HS256 token issuing and login URL construction

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tracing::{info, warn};
use uuid::Uuid;

use super::claims::{IssuedToken, JwtSettings, LoginClaims, TokenClaims};
use crate::error::{SdkError, SdkResult};
use crate::time::{shared, SharedClock, SystemClock};

/// Secrets shorter than this are accepted but logged as weak
pub const RECOMMENDED_SECRET_BYTES: usize = 32;

/// Signs [`LoginClaims`] into JWTs
#[derive(Debug, Clone)]
pub struct JwtIssuer {
    settings: JwtSettings,
    clock: SharedClock,
}

impl Default for JwtIssuer {
    fn default() -> Self {
        Self::new(JwtSettings::default())
    }
}

impl JwtIssuer {
    /// Issuer on the system clock
    pub fn new(settings: JwtSettings) -> Self {
        Self::with_clock(settings, shared(SystemClock))
    }

    /// Issuer reading time from `clock`
    pub fn with_clock(settings: JwtSettings, clock: SharedClock) -> Self {
        Self { settings, clock }
    }

    /// Settings applied to every token
    pub fn settings(&self) -> &JwtSettings {
        &self.settings
    }

    /// Sign `claims` with `secret`
    ///
    /// All argument checks run before anything is signed.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty secret, missing required claims or a
    /// lifetime that is non-positive or too large to represent; `Crypto` if
    /// signing fails.
    pub fn issue(&self, claims: &LoginClaims, secret: &str) -> SdkResult<IssuedToken> {
        if secret.is_empty() {
            return Err(SdkError::invalid_argument("secret", "must not be empty"));
        }
        claims.validate()?;
        if secret.len() < RECOMMENDED_SECRET_BYTES {
            warn!(
                secret_bytes = secret.len(),
                recommended = RECOMMENDED_SECRET_BYTES,
                "JWT secret is shorter than recommended"
            );
        }

        let now = self.clock.now();
        let expires_at = chrono::Duration::try_seconds(claims.expiration_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                SdkError::invalid_argument(
                    "expiration_seconds",
                    format!("{} seconds is beyond the representable range", claims.expiration_seconds),
                )
            })?;
        let jti = Uuid::new_v4().to_string();
        let wire = TokenClaims::build(claims, &self.settings, now.timestamp(), jti);

        let token = encode(
            &Header::new(Algorithm::HS256),
            &wire,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| SdkError::crypto(format!("Failed to sign token: {e}")))?;

        info!(
            organization = %claims.organization,
            jti = %wire.jti,
            expires_at = %expires_at,
            "issued login token"
        );
        Ok(IssuedToken { token, expires_at })
    }

    /// Issue a token and append it to a login URL as `?token=<token>`
    ///
    /// Uses [`JwtSettings::login_url`] unless `base_url` is given. Exactly
    /// one `/` separates the base from the query.
    ///
    /// # Errors
    /// Same as [`JwtIssuer::issue`], plus `InvalidArgument` for an empty
    /// base URL.
    pub fn issue_login_url(
        &self,
        claims: &LoginClaims,
        secret: &str,
        base_url: Option<&str>,
    ) -> SdkResult<String> {
        let base = base_url.unwrap_or(&self.settings.login_url).trim();
        SdkError::require_non_empty("base_url", base)?;

        let issued = self.issue(claims, secret)?;
        Ok(format!(
            "{}/?token={}",
            base.trim_end_matches('/'),
            urlencoding::encode(&issued.token)
        ))
    }

    /// Structural check only; the signature is not verified
    ///
    /// True iff the token has exactly three non-empty dot-separated
    /// segments and the first two decode to JSON objects.
    pub fn is_well_formed(token: &str) -> bool {
        let segments: Vec<&str> = token.split('.').collect();
        let [header, payload, signature] = segments.as_slice() else {
            return false;
        };
        if signature.is_empty() {
            return false;
        }
        [header, payload].iter().all(|segment| decodes_to_object(segment))
    }
}

fn decodes_to_object(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    URL_SAFE_NO_PAD
        .decode(segment)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
        .is_some_and(|value| value.is_object())
}
