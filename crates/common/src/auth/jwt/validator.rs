//! HS256 token validation with configurable claim requirements
//!
//! [`JwtValidator::validate`] never returns an error: every failure is
//! reported through [`ValidationOutcome`] with a distinct
//! [`ValidationFailure`] and a readable reason.
//!
//! Signature checking is delegated to `jsonwebtoken`. Lifetime, issuer and
//! audience are checked here against the injected clock so the clock skew
//! is applied consistently.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::issuer::JwtIssuer;
use crate::time::{shared, SharedClock, SystemClock};

/// Default tolerance applied to `exp` and `nbf`
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Validation requirements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Check `iss`
    pub validate_issuer: bool,
    /// Expected `iss`; any non-empty issuer when `None`
    pub valid_issuer: Option<String>,
    /// Check `aud`
    pub validate_audience: bool,
    /// Expected `aud`; any audience when `None`
    pub valid_audience: Option<String>,
    /// Check `exp` and `nbf`
    pub validate_lifetime: bool,
    /// Tolerance applied to lifetime checks
    pub clock_skew: Duration,
    /// Claims that must be present and non-empty
    pub required_claims: Vec<String>,
    /// Exact value required for the `organization` claim
    pub required_organization: Option<String>,
    /// Claim name to required value
    pub required_claim_values: BTreeMap<String, String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            validate_issuer: false,
            valid_issuer: None,
            validate_audience: false,
            valid_audience: None,
            validate_lifetime: true,
            clock_skew: DEFAULT_CLOCK_SKEW,
            required_claims: Vec::new(),
            required_organization: None,
            required_claim_values: BTreeMap::new(),
        }
    }
}

impl ValidationOptions {
    /// Require `iss` to equal `issuer`
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.validate_issuer = true;
        self.valid_issuer = Some(issuer.into());
        self
    }

    /// Require `aud` to equal (or contain) `audience`
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.validate_audience = true;
        self.valid_audience = Some(audience.into());
        self
    }

    /// Toggle `exp`/`nbf` checks
    #[must_use]
    pub fn with_lifetime_validation(mut self, enabled: bool) -> Self {
        self.validate_lifetime = enabled;
        self
    }

    /// Set the lifetime tolerance
    #[must_use]
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Require a non-empty claim
    #[must_use]
    pub fn with_required_claim(mut self, claim: impl Into<String>) -> Self {
        self.required_claims.push(claim.into());
        self
    }

    /// Require an exact `organization` claim
    #[must_use]
    pub fn with_required_organization(mut self, organization: impl Into<String>) -> Self {
        self.required_organization = Some(organization.into());
        self
    }

    /// Require a claim to carry `value`
    #[must_use]
    pub fn with_required_claim_value(
        mut self,
        claim: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.required_claim_values.insert(claim.into(), value.into());
        self
    }
}

/// Why a token was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// Empty secret
    #[error("Secret must not be empty")]
    EmptySecret,

    /// Token structure or header is unusable
    #[error("Token is malformed: {0}")]
    Malformed(String),

    /// Signature does not match the secret
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// `exp` plus skew is in the past
    #[error("Token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    /// `nbf` minus skew is in the future
    #[error("Token is not valid before {not_before}")]
    NotYetValid { not_before: DateTime<Utc> },

    /// `iss` does not match
    #[error("Token issuer mismatch: expected '{expected}', found '{}'", .actual.as_deref().unwrap_or("<none>"))]
    InvalidIssuer { expected: String, actual: Option<String> },

    /// `aud` does not match
    #[error("Token audience mismatch: expected '{expected}'")]
    InvalidAudience { expected: String },

    /// Required claims are absent or empty
    #[error("Token is missing required claims: {}", .0.join(", "))]
    MissingClaims(Vec<String>),

    /// `organization` does not match
    #[error("Organization mismatch: expected '{expected}', found '{}'", .actual.as_deref().unwrap_or("<none>"))]
    OrganizationMismatch { expected: String, actual: Option<String> },

    /// A required claim value is absent
    #[error("Claim '{claim}' mismatch: expected '{expected}', found '{}'", .actual.as_deref().unwrap_or("<none>"))]
    ClaimValueMismatch { claim: String, expected: String, actual: Option<String> },
}

/// Result of a validation call
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// Whether every check passed
    pub is_valid: bool,
    /// Display text of `failure`
    pub failure_reason: Option<String>,
    /// First failed check
    pub failure: Option<ValidationFailure>,
    /// Claims of a valid token
    pub claims: Option<ResolvedClaims>,
}

impl ValidationOutcome {
    fn success(claims: ResolvedClaims) -> Self {
        Self { is_valid: true, failure_reason: None, failure: None, claims: Some(claims) }
    }

    fn failed(failure: ValidationFailure) -> Self {
        debug!(reason = %failure, "token validation failed");
        Self {
            is_valid: false,
            failure_reason: Some(failure.to_string()),
            failure: Some(failure),
            claims: None,
        }
    }
}

/// Claims of a successfully validated token
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedClaims {
    claims: Map<String, Value>,
}

impl ResolvedClaims {
    /// `sub` claim
    pub fn subject(&self) -> Option<String> {
        self.claim("sub")
    }

    /// `email` claim
    pub fn email(&self) -> Option<String> {
        self.claim("email")
    }

    /// `organization` claim
    pub fn organization(&self) -> Option<String> {
        self.claim("organization")
    }

    /// `role` claim
    pub fn role(&self) -> Option<String> {
        self.claim("role")
    }

    /// Single value of a claim; arrays yield their first element
    pub fn claim(&self, name: &str) -> Option<String> {
        self.claim_values(name).into_iter().next()
    }

    /// Every value of a claim; scalars yield one element
    pub fn claim_values(&self, name: &str) -> Vec<String> {
        match self.claims.get(name) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().filter_map(render_scalar).collect(),
            Some(value) => render_scalar(value).into_iter().collect(),
        }
    }

    /// `exp` as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("exp")
    }

    /// `iat` as a timestamp
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("iat")
    }

    /// Claim names with their rendered values
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec<String>)> + '_ {
        self.claims.keys().map(|name| (name.as_str(), self.claim_values(name)))
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.claims.get(name).and_then(Value::as_i64).and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    fn has_value(&self, name: &str) -> bool {
        match self.claims.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Verifies HS256 tokens against [`ValidationOptions`]
#[derive(Debug, Clone)]
pub struct JwtValidator {
    clock: SharedClock,
}

impl Default for JwtValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl JwtValidator {
    /// Validator on the system clock
    pub fn new() -> Self {
        Self::with_clock(shared(SystemClock))
    }

    /// Validator reading time from `clock`
    pub fn with_clock(clock: SharedClock) -> Self {
        Self { clock }
    }

    /// Validate `token` signed with `secret`
    pub fn validate(&self, token: &str, secret: &str, options: &ValidationOptions) -> ValidationOutcome {
        match self.check(token, secret, options) {
            Ok(claims) => ValidationOutcome::success(claims),
            Err(failure) => ValidationOutcome::failed(failure),
        }
    }

    fn check(
        &self,
        token: &str,
        secret: &str,
        options: &ValidationOptions,
    ) -> Result<ResolvedClaims, ValidationFailure> {
        if secret.is_empty() {
            return Err(ValidationFailure::EmptySecret);
        }
        if !JwtIssuer::is_well_formed(token) {
            return Err(ValidationFailure::Malformed(
                "expected three base64url segments".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        let data = decode::<Map<String, Value>>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|err| match err.kind() {
            ErrorKind::InvalidSignature => ValidationFailure::InvalidSignature,
            ErrorKind::InvalidAlgorithm => {
                ValidationFailure::Malformed("unsupported signing algorithm".to_string())
            }
            _ => ValidationFailure::Malformed(err.to_string()),
        })?;
        let claims = ResolvedClaims { claims: data.claims };

        if options.validate_lifetime {
            self.check_lifetime(&claims, options.clock_skew)?;
        }
        if options.validate_issuer {
            check_issuer(&claims, options.valid_issuer.as_deref())?;
        }
        if options.validate_audience {
            check_audience(&claims, options.valid_audience.as_deref())?;
        }

        let missing: Vec<String> = options
            .required_claims
            .iter()
            .filter(|name| !claims.has_value(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ValidationFailure::MissingClaims(missing));
        }

        if let Some(expected) = &options.required_organization {
            let actual = claims.organization();
            if actual.as_deref() != Some(expected.as_str()) {
                return Err(ValidationFailure::OrganizationMismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        for (claim, expected) in &options.required_claim_values {
            let values = claims.claim_values(claim);
            if !values.iter().any(|value| value == expected) {
                return Err(ValidationFailure::ClaimValueMismatch {
                    claim: claim.clone(),
                    expected: expected.clone(),
                    actual: values.into_iter().next(),
                });
            }
        }

        Ok(claims)
    }

    fn check_lifetime(&self, claims: &ResolvedClaims, skew: Duration) -> Result<(), ValidationFailure> {
        let now = self.clock.now();
        let skew = chrono::Duration::from_std(skew).unwrap_or(chrono::Duration::MAX);

        let expired_at = claims
            .expires_at()
            .ok_or_else(|| ValidationFailure::MissingClaims(vec!["exp".to_string()]))?;
        // An overflowing bound lies past any representable `now`
        if expired_at.checked_add_signed(skew).is_some_and(|limit| limit < now) {
            return Err(ValidationFailure::Expired { expired_at });
        }
        if let Some(not_before) = claims.timestamp("nbf") {
            if not_before.checked_sub_signed(skew).is_some_and(|start| start > now) {
                return Err(ValidationFailure::NotYetValid { not_before });
            }
        }
        Ok(())
    }
}

fn check_issuer(claims: &ResolvedClaims, expected: Option<&str>) -> Result<(), ValidationFailure> {
    let actual = claims.claim("iss");
    let accepted = match expected {
        Some(expected) => actual.as_deref() == Some(expected),
        None => actual.is_some(),
    };
    if accepted {
        Ok(())
    } else {
        Err(ValidationFailure::InvalidIssuer {
            expected: expected.unwrap_or_default().to_string(),
            actual,
        })
    }
}

fn check_audience(claims: &ResolvedClaims, expected: Option<&str>) -> Result<(), ValidationFailure> {
    let audiences = claims.claim_values("aud");
    let accepted = match expected {
        Some(expected) => audiences.iter().any(|aud| aud == expected),
        None => !audiences.is_empty(),
    };
    if accepted {
        Ok(())
    } else {
        Err(ValidationFailure::InvalidAudience { expected: expected.unwrap_or_default().to_string() })
    }
}
