//! HTTP failure classification
//!
//! Maps a failed response (status code, optional JSON body, optional request
//! id) onto an [`SdkError`]. The mapping is deterministic: the same status
//! and body always produce the same category. Bodies that are not in the
//! expected shape fall back to per-status default messages.

use std::time::Duration;

use serde::Deserialize;

use super::{ResponseContext, SdkError};
use crate::time::{Clock, SharedClock, SystemClock};

/// Assumed duration for HTTP 408 responses
pub const REQUEST_TIMEOUT_DURATION: Duration = Duration::from_secs(30);

/// Assumed duration for HTTP 504 responses
pub const GATEWAY_TIMEOUT_DURATION: Duration = Duration::from_secs(60);

const MAX_RAW_DETAIL_CHARS: usize = 1024;

/// Error payload returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponseBody {
    /// Primary message
    pub message: Option<String>,
    /// Extra detail
    pub details: Option<String>,
    /// Machine-readable code
    pub code: Option<String>,
    /// Per-field problems
    pub validation_errors: Option<Vec<ValidationErrorEntry>>,
    /// Seconds until requests are accepted again
    pub retry_after_seconds: Option<i64>,
    /// Requests left in the window
    pub remaining_requests: Option<u32>,
    /// Requests allowed per window
    pub request_limit: Option<u32>,
}

/// A single entry of `validationErrors`, either bare text or field-scoped
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ValidationErrorEntry {
    /// Bare message
    Text(String),
    /// Message scoped to a field
    Field {
        #[serde(default)]
        field: Option<String>,
        message: String,
    },
}

impl ValidationErrorEntry {
    /// Render the entry as a single human-readable message
    pub fn to_message(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Field { field: Some(field), message } => format!("{field}: {message}"),
            Self::Field { field: None, message } => message.clone(),
        }
    }
}

/// Classifies failed HTTP responses into [`SdkError`] values
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    clock: SharedClock,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::system()
    }
}

impl ErrorClassifier {
    /// Classifier reading time from the given clock (used for retry-after)
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }

    /// Classifier backed by the system clock
    pub fn system() -> Self {
        Self::new(std::sync::Arc::new(SystemClock))
    }

    /// Parse an error body, returning `None` for empty or non-conforming
    /// payloads
    pub fn parse_body(body: Option<&str>) -> Option<ErrorResponseBody> {
        let raw = body.map(str::trim).filter(|raw| !raw.is_empty())?;
        serde_json::from_str::<ErrorResponseBody>(raw).ok()
    }

    /// Classify a failed response
    pub fn classify(&self, status: u16, body: Option<&str>, request_id: Option<&str>) -> SdkError {
        let parsed = Self::parse_body(body);
        let details = match &parsed {
            Some(parsed) => parsed.details.clone(),
            None => body.map(str::trim).filter(|raw| !raw.is_empty()).map(truncate_detail),
        };
        let context = ResponseContext::status(status)
            .with_request_id(request_id.map(str::to_string))
            .with_details(details);
        let parsed = parsed.unwrap_or_default();
        let message = parsed.message.clone().filter(|m| !m.trim().is_empty());

        match status {
            401 => SdkError::Authentication {
                code: "UNAUTHORIZED".to_string(),
                message: message.unwrap_or_else(|| {
                    "Authentication failed: the API key is missing or invalid".to_string()
                }),
                context,
            },
            403 => SdkError::Authentication {
                code: "FORBIDDEN".to_string(),
                message: message.unwrap_or_else(|| {
                    "Access denied: the credentials do not permit this operation".to_string()
                }),
                context,
            },
            400 => {
                let mut messages: Vec<String> = parsed
                    .validation_errors
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(ValidationErrorEntry::to_message)
                    .collect();
                if messages.is_empty() {
                    messages.push(message.unwrap_or_else(|| "The request was invalid".to_string()));
                }
                SdkError::Validation { messages, context }
            }
            429 => SdkError::RateLimit {
                message: message.unwrap_or_else(|| "Rate limit exceeded".to_string()),
                retry_after: parsed
                    .retry_after_seconds
                    .filter(|secs| *secs >= 0)
                    .and_then(chrono::Duration::try_seconds)
                    .and_then(|delay| self.clock.now().checked_add_signed(delay)),
                remaining: parsed.remaining_requests,
                limit: parsed.request_limit,
                context,
            },
            408 => SdkError::Timeout {
                message: message.unwrap_or_else(|| "Request timed out".to_string()),
                duration: REQUEST_TIMEOUT_DURATION,
                context,
            },
            504 => SdkError::Timeout {
                message: message.unwrap_or_else(|| "Gateway timed out".to_string()),
                duration: GATEWAY_TIMEOUT_DURATION,
                context,
            },
            500 | 502 | 503 => {
                let (code, default_message) = match status {
                    500 => ("INTERNAL_SERVER_ERROR", "Internal server error"),
                    502 => ("BAD_GATEWAY", "Bad gateway"),
                    _ => ("SERVICE_UNAVAILABLE", "Service unavailable"),
                };
                SdkError::Api {
                    code: code.to_string(),
                    message: message.unwrap_or_else(|| default_message.to_string()),
                    context,
                }
            }
            other => SdkError::Api {
                code: parsed.code.clone().unwrap_or_else(|| format!("HTTP_{other}")),
                message: match message {
                    Some(message) => format!("HTTP {other}: {message}"),
                    None => format!("HTTP request failed with status {other}"),
                },
                context,
            },
        }
    }
}

fn truncate_detail(raw: &str) -> String {
    if raw.chars().count() <= MAX_RAW_DETAIL_CHARS {
        raw.to_string()
    } else {
        let mut kept: String = raw.chars().take(MAX_RAW_DETAIL_CHARS).collect();
        kept.push_str("...");
        kept
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::error::ErrorCategory;
    use crate::time::MockClock;

    fn fixed_classifier() -> (ErrorClassifier, MockClock) {
        let clock = MockClock::at(Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap());
        (ErrorClassifier::new(std::sync::Arc::new(clock.clone())), clock)
    }

    #[test]
    fn auth_statuses_map_to_authentication() {
        let classifier = ErrorClassifier::system();
        for status in [401, 403] {
            let err = classifier.classify(status, None, None);
            assert_eq!(err.category(), ErrorCategory::Authentication);
            assert_eq!(err.http_status(), Some(status));
        }
        assert_eq!(classifier.classify(401, None, None).error_code(), "UNAUTHORIZED");
        assert_eq!(classifier.classify(403, None, None).error_code(), "FORBIDDEN");
    }

    #[test]
    fn validation_list_is_carried_in_full() {
        let body = r#"{"message":"Invalid","validationErrors":["title is required",{"field":"email","message":"is malformed"}]}"#;
        let err = ErrorClassifier::system().classify(400, Some(body), None);

        assert_eq!(
            err.validation_messages(),
            &["title is required".to_string(), "email: is malformed".to_string()]
        );
    }

    #[test]
    fn bad_request_without_list_synthesizes_one_message() {
        let err = ErrorClassifier::system().classify(400, Some(r#"{"message":"Bad folder"}"#), None);
        assert_eq!(err.validation_messages(), &["Bad folder".to_string()]);

        let err = ErrorClassifier::system().classify(400, None, None);
        assert_eq!(err.validation_messages(), &["The request was invalid".to_string()]);
    }

    #[test]
    fn out_of_range_retry_after_is_dropped() {
        let (classifier, _) = fixed_classifier();
        for secs in [i64::MAX, 9_000_000_000_000] {
            let body = format!(r#"{{"retryAfterSeconds":{secs},"remainingRequests":0}}"#);
            match classifier.classify(429, Some(&body), None) {
                SdkError::RateLimit { retry_after, remaining, .. } => {
                    assert_eq!(retry_after, None);
                    assert_eq!(remaining, Some(0));
                }
                other => panic!("expected rate limit, got {other:?}"),
            }
        }
    }

    #[test]
    fn rate_limit_uses_clock_for_retry_after() {
        let (classifier, clock) = fixed_classifier();
        let body = r#"{"retryAfterSeconds":60,"remainingRequests":0,"requestLimit":100}"#;

        match classifier.classify(429, Some(body), Some("abc")) {
            SdkError::RateLimit { retry_after, remaining, limit, context, .. } => {
                assert_eq!(retry_after, Some(clock.now() + chrono::Duration::seconds(60)));
                assert_eq!(remaining, Some(0));
                assert_eq!(limit, Some(100));
                assert_eq!(context.request_id.as_deref(), Some("abc"));
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[test]
    fn timeouts_carry_fixed_durations() {
        let classifier = ErrorClassifier::system();
        match classifier.classify(408, None, None) {
            SdkError::Timeout { duration, .. } => assert_eq!(duration, Duration::from_secs(30)),
            other => panic!("unexpected {other:?}"),
        }
        match classifier.classify(504, None, None) {
            SdkError::Timeout { duration, .. } => assert_eq!(duration, Duration::from_secs(60)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn server_errors_have_distinct_codes() {
        let classifier = ErrorClassifier::system();
        let codes: Vec<String> = [500, 502, 503]
            .into_iter()
            .map(|status| classifier.classify(status, None, None).error_code().to_string())
            .collect();
        assert_eq!(codes, ["INTERNAL_SERVER_ERROR", "BAD_GATEWAY", "SERVICE_UNAVAILABLE"]);
    }

    #[test]
    fn unknown_status_mentions_number() {
        let err = ErrorClassifier::system().classify(418, None, None);
        assert_eq!(err.category(), ErrorCategory::Api);
        assert_eq!(err.error_code(), "HTTP_418");
        assert!(err.to_string().contains("418"));
    }

    #[test]
    fn unparseable_body_becomes_detail_not_message() {
        let err = ErrorClassifier::system().classify(502, Some("<html>upstream died</html>"), None);
        assert_eq!(err.to_string(), "Bad gateway");
        assert_eq!(err.details(), Some("<html>upstream died</html>"));
    }
}
