//! Referee candidate models

use serde::{Deserialize, Serialize};

use super::manuscript::Author;
use crate::impl_wire_enum_conversions;

/// Ranked referee suggestion for a manuscript
///
/// Flat shape. Aliases accept the older camelCase and `full_name` spellings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefereeCandidate {
    #[serde(alias = "id", alias = "authorId")]
    pub author_id: i64,
    #[serde(alias = "full_name", alias = "fullName")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, alias = "hIndex", skip_serializing_if = "Option::is_none")]
    pub h_index: Option<u32>,
    #[serde(default, alias = "articlesCount", skip_serializing_if = "Option::is_none")]
    pub articles_count: Option<u32>,
    #[serde(default, alias = "citationsCount", skip_serializing_if = "Option::is_none")]
    pub citations_count: Option<u32>,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RefereeCandidate {
    /// Author view of the candidate
    pub fn as_author(&self) -> Author {
        Author { name: self.name.clone(), email: self.email.clone(), orcid: self.orcid.clone() }
    }
}

/// Referee lifecycle as reported by webhooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefereeStatus {
    Suggested,
    Invited,
    Agreed,
    Declined,
    Completed,
    #[serde(other)]
    Unknown,
}

impl_wire_enum_conversions!(RefereeStatus {
    Suggested => "suggested",
    Invited => "invited",
    Agreed => "agreed",
    Declined => "declined",
    Completed => "completed",
    Unknown => "unknown",
});
