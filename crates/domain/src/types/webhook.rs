//! Inbound webhook payloads
//!
//! Events are tagged by `event_type`. Unrecognized event types decode to
//! [`WebhookEvent::Unknown`] so new platform events do not break receivers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::manuscript::ManuscriptStatus;
use super::referee::RefereeStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum WebhookEvent {
    ManuscriptProcessed {
        manuscript_id: i64,
        #[serde(default)]
        origin_id: Option<String>,
        #[serde(default)]
        candidates_count: Option<u32>,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    ManuscriptStatusChanged {
        manuscript_id: i64,
        status: ManuscriptStatus,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    RefereeStatusChanged {
        manuscript_id: i64,
        author_id: i64,
        status: RefereeStatus,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    AuthorGroupUpdated {
        group_id: i64,
        #[serde(default)]
        authors_count: Option<u32>,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    #[serde(other)]
    Unknown,
}

impl WebhookEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ManuscriptProcessed { .. } => "manuscript_processed",
            Self::ManuscriptStatusChanged { .. } => "manuscript_status_changed",
            Self::RefereeStatusChanged { .. } => "referee_status_changed",
            Self::AuthorGroupUpdated { .. } => "author_group_updated",
            Self::Unknown => "unknown",
        }
    }

    pub fn manuscript_id(&self) -> Option<i64> {
        match self {
            Self::ManuscriptProcessed { manuscript_id, .. }
            | Self::ManuscriptStatusChanged { manuscript_id, .. }
            | Self::RefereeStatusChanged { manuscript_id, .. } => Some(*manuscript_id),
            Self::AuthorGroupUpdated { .. } | Self::Unknown => None,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::ManuscriptProcessed { timestamp, .. }
            | Self::ManuscriptStatusChanged { timestamp, .. }
            | Self::RefereeStatusChanged { timestamp, .. }
            | Self::AuthorGroupUpdated { timestamp, .. } => *timestamp,
            Self::Unknown => None,
        }
    }
}
