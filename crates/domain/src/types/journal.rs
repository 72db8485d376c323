//! Journal recommendation models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecommendation {
    #[serde(alias = "id")]
    pub journal_id: i64,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub issn: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub url: Option<String>,
}

/// Journals ranked for one manuscript, best match first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecommendationsResponse {
    pub manuscript_id: i64,
    #[serde(default, alias = "recommendations")]
    pub journals: Vec<JournalRecommendation>,
}

impl JournalRecommendationsResponse {
    pub fn best(&self) -> Option<&JournalRecommendation> {
        self.journals.iter().max_by(|a, b| a.score.total_cmp(&b.score))
    }
}
