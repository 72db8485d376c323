//! Error taxonomy for the Prophy SDK
//!
//! Every fallible SDK operation returns [`SdkResult`]. [`SdkError`] is a
//! single tagged union whose [`ErrorCategory`] lets callers branch on the
//! kind of failure without matching on message text:
//!
//! | Category | Produced by |
//! |----------|-------------|
//! | `Authentication` | HTTP 401/403, OAuth `error` responses |
//! | `Validation` | HTTP 400 (one or more messages) |
//! | `RateLimit` | HTTP 429 (retry-after, remaining, limit) |
//! | `Timeout` | HTTP 408/504, client timeouts, cancellation |
//! | `Serialization` | Response bodies that do not match the expected type |
//! | `Api` | Any other HTTP failure, keyed by a machine error code |
//! | `InvalidArgument` | Eager parameter validation |
//! | `InvalidOperation` | Calls made in an unusable state (e.g. no API key) |
//! | `Transport` | Connection-level failures |
//! | `Crypto` | Encryption or signing failures |
//!
//! Primary messages stay short and human readable; raw response bodies are
//! attached through [`ResponseContext::details`].
//!
//! ## ErrorClassification Trait
//!
//! [`ErrorClassification`] mirrors the information a retry layer needs
//! (`is_retryable`, `severity`, `retry_after`). The SDK itself never
//! retries.
//!
//! ```rust
//! use prophy_common::error::{ErrorCategory, ErrorClassifier};
//!
//! let error = ErrorClassifier::system().classify(401, None, Some("req-1"));
//! assert_eq!(error.category(), ErrorCategory::Authentication);
//! assert_eq!(error.request_id(), Some("req-1"));
//! ```

pub mod classify;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use classify::{ErrorClassifier, ErrorResponseBody, ValidationErrorEntry};

/// Maximum number of characters of an offending payload kept on a
/// serialization error.
pub const MAX_PAYLOAD_DISPLAY_CHARS: usize = 512;

/// Standard result type using [`SdkError`]
pub type SdkResult<T> = Result<T, SdkError>;

/// Closed set of failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Rejected credentials (401/403)
    Authentication,
    /// Rejected request content (400)
    Validation,
    /// Throttled (429)
    RateLimit,
    /// Timed out or cancelled
    Timeout,
    /// Body did not match the expected type
    Serialization,
    /// Other HTTP failure
    Api,
    /// Bad caller argument
    InvalidArgument,
    /// Call not valid in the current state
    InvalidOperation,
    /// Network failure
    Transport,
    /// Encryption or signing failure
    Crypto,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Authentication => "authentication",
            Self::Validation => "validation",
            Self::RateLimit => "rate_limit",
            Self::Timeout => "timeout",
            Self::Serialization => "serialization",
            Self::Api => "api",
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidOperation => "invalid_operation",
            Self::Transport => "transport",
            Self::Crypto => "crypto",
        };
        f.write_str(label)
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Expected conditions
    Info,
    /// Degraded but recoverable (rate limits, timeouts)
    Warning,
    /// Failure requiring attention
    Error,
    /// Integrity at risk
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Standard interface for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Whether a caller-side retry could reasonably succeed
    fn is_retryable(&self) -> bool;

    /// Severity level of the error
    fn severity(&self) -> ErrorSeverity;

    /// Whether the error requires immediate attention
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Suggested delay before retrying, if known
    fn retry_after(&self) -> Option<Duration>;
}

/// HTTP metadata attached to errors derived from a response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseContext {
    /// HTTP status code, when the error came from a response
    pub status: Option<u16>,
    /// Server-assigned request identifier (`X-Request-Id`)
    pub request_id: Option<String>,
    /// Technical detail (server `details` field or raw body)
    pub details: Option<String>,
}

impl ResponseContext {
    /// Context carrying only a status code
    pub fn status(status: u16) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    /// Attach a request identifier
    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Attach technical detail
    #[must_use]
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}

/// Unified SDK error
#[derive(Debug, Clone, Error)]
pub enum SdkError {
    /// Credentials were rejected (401/403) or an OAuth grant failed
    #[error("{message}")]
    Authentication { code: String, message: String, context: ResponseContext },

    /// Request failed server-side validation
    #[error("{}", summarize_messages(.messages))]
    Validation { messages: Vec<String>, context: ResponseContext },

    /// Request quota exhausted
    #[error("{message}")]
    RateLimit {
        message: String,
        retry_after: Option<DateTime<Utc>>,
        remaining: Option<u32>,
        limit: Option<u32>,
        context: ResponseContext,
    },

    /// Operation exceeded its time budget or was cancelled
    #[error("{message}")]
    Timeout { message: String, duration: Duration, context: ResponseContext },

    /// Payload could not be (de)serialized into the target type
    #[error("Failed to deserialize {target_type}: {message}")]
    Serialization { target_type: String, message: String, payload: Option<String> },

    /// Any other API failure, identified by a machine error code
    #[error("{message}")]
    Api { code: String, message: String, context: ResponseContext },

    /// Caller supplied an invalid parameter
    #[error("Invalid argument '{parameter}': {message}")]
    InvalidArgument { parameter: String, message: String },

    /// Operation is not valid in the current state
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    /// Connection-level failure
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Encryption, decryption or signing failure
    #[error("Cryptographic operation failed: {message}")]
    Crypto { message: String },
}

fn summarize_messages(messages: &[String]) -> String {
    match messages {
        [] => "Validation failed".to_string(),
        [single] => single.clone(),
        many => format!("Validation failed: {}", many.join("; ")),
    }
}

impl SdkError {
    /// Create an invalid argument error
    pub fn invalid_argument<P: Into<String>, M: Into<String>>(parameter: P, message: M) -> Self {
        Self::InvalidArgument { parameter: parameter.into(), message: message.into() }
    }

    /// Create an invalid operation error
    pub fn invalid_operation<M: Into<String>>(message: M) -> Self {
        Self::InvalidOperation { message: message.into() }
    }

    /// Create a transport error
    pub fn transport<M: Into<String>>(message: M) -> Self {
        Self::Transport { message: message.into() }
    }

    /// Create a cryptographic error
    pub fn crypto<M: Into<String>>(message: M) -> Self {
        Self::Crypto { message: message.into() }
    }

    /// Create a timeout error without HTTP context
    pub fn timeout<M: Into<String>>(message: M, duration: Duration) -> Self {
        Self::Timeout { message: message.into(), duration, context: ResponseContext::default() }
    }

    /// Error raised when a caller-supplied cancellation token fires
    pub fn cancelled(elapsed: Duration) -> Self {
        Self::timeout("Operation was cancelled", elapsed)
    }

    /// Create a serialization error for target type `T`
    ///
    /// The offending payload is truncated to
    /// [`MAX_PAYLOAD_DISPLAY_CHARS`] characters.
    pub fn serialization<T: ?Sized>(message: impl fmt::Display, payload: Option<&str>) -> Self {
        Self::Serialization {
            target_type: std::any::type_name::<T>().to_string(),
            message: message.to_string(),
            payload: payload.map(truncate_payload),
        }
    }

    /// Fail with `InvalidArgument` when `value` is empty or whitespace
    pub fn require_non_empty(parameter: &str, value: &str) -> SdkResult<()> {
        if value.trim().is_empty() {
            return Err(Self::invalid_argument(parameter, "must not be empty"));
        }
        Ok(())
    }

    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::RateLimit { .. } => ErrorCategory::RateLimit,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Serialization { .. } => ErrorCategory::Serialization,
            Self::Api { .. } => ErrorCategory::Api,
            Self::InvalidArgument { .. } => ErrorCategory::InvalidArgument,
            Self::InvalidOperation { .. } => ErrorCategory::InvalidOperation,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Crypto { .. } => ErrorCategory::Crypto,
        }
    }

    /// Stable machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            Self::Authentication { code, .. } | Self::Api { code, .. } => code,
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::RateLimit { .. } => "RATE_LIMIT_EXCEEDED",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Serialization { .. } => "SERIALIZATION_ERROR",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::InvalidOperation { .. } => "INVALID_OPERATION",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Crypto { .. } => "CRYPTO_ERROR",
        }
    }

    /// HTTP response metadata, for errors derived from a response
    pub fn context(&self) -> Option<&ResponseContext> {
        match self {
            Self::Authentication { context, .. }
            | Self::Validation { context, .. }
            | Self::RateLimit { context, .. }
            | Self::Timeout { context, .. }
            | Self::Api { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status code, if any
    pub fn http_status(&self) -> Option<u16> {
        self.context().and_then(|ctx| ctx.status)
    }

    /// Server request identifier, if any
    pub fn request_id(&self) -> Option<&str> {
        self.context().and_then(|ctx| ctx.request_id.as_deref())
    }

    /// Technical detail attached to the error, if any
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Serialization { payload, .. } => payload.as_deref(),
            _ => self.context().and_then(|ctx| ctx.details.as_deref()),
        }
    }

    /// Validation messages (empty for non-validation errors)
    pub fn validation_messages(&self) -> &[String] {
        match self {
            Self::Validation { messages, .. } => messages,
            _ => &[],
        }
    }
}

impl ErrorClassification for SdkError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimit { .. } | Self::Timeout { .. } | Self::Transport { .. } => true,
            Self::Api { context, .. } => matches!(context.status, Some(500 | 502 | 503)),
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RateLimit { .. } | Self::Timeout { .. } | Self::Authentication { .. } => {
                ErrorSeverity::Warning
            }
            Self::Crypto { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after: Some(at), .. } => {
                (*at - Utc::now()).to_std().ok().or(Some(Duration::ZERO))
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            target_type: "JSON".to_string(),
            message: err.to_string(),
            payload: None,
        }
    }
}

#[cfg(feature = "runtime")]
impl SdkError {
    /// Map a `reqwest` failure, treating client timeouts as `Timeout`
    pub fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("Request timed out after {timeout:?}"), timeout)
        } else if err.is_decode() {
            Self::Serialization {
                target_type: "response body".to_string(),
                message: err.to_string(),
                payload: None,
            }
        } else {
            Self::transport(err.to_string())
        }
    }
}

fn truncate_payload(payload: &str) -> String {
    if payload.chars().count() <= MAX_PAYLOAD_DISPLAY_CHARS {
        return payload.to_string();
    }
    let mut truncated: String = payload.chars().take(MAX_PAYLOAD_DISPLAY_CHARS).collect();
    truncated.push_str("...");
    truncated
}
