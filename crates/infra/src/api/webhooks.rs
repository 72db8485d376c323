//! Inbound webhook decoding

use prophy_common::error::{SdkError, SdkResult};
use prophy_domain::WebhookEvent;
use tracing::{debug, warn};

/// Decode a webhook request body into a typed event
///
/// Unrecognized `event_type` values decode to [`WebhookEvent::Unknown`].
///
/// # Errors
/// `Serialization` when the body is not JSON or lacks `event_type`.
pub fn parse_event(body: &str) -> SdkResult<WebhookEvent> {
    match serde_json::from_str::<WebhookEvent>(body) {
        Ok(event) => {
            debug!(event_type = event.event_type(), manuscript_id = ?event.manuscript_id(), "webhook decoded");
            if event == WebhookEvent::Unknown {
                warn!("webhook with unrecognized event_type ignored");
            }
            Ok(event)
        }
        Err(err) => Err(SdkError::serialization::<WebhookEvent>(err, Some(body))),
    }
}

/// Byte-slice variant of [`parse_event`]
pub fn parse_event_bytes(body: &[u8]) -> SdkResult<WebhookEvent> {
    let text = std::str::from_utf8(body)
        .map_err(|err| SdkError::serialization::<WebhookEvent>(err, None))?;
    parse_event(text)
}
