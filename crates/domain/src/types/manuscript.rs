//! Manuscript upload and retrieval models

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::referee::RefereeCandidate;
use crate::impl_wire_enum_conversions;

/// Manuscript author
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_orcid(mut self, orcid: impl Into<String>) -> Self {
        self.orcid = Some(orcid.into());
        self
    }
}

/// Constraints applied when the platform ranks referee candidates
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RefereeFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_academic_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_academic_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_articles_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_coi: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl RefereeFilters {
    /// Set filters as `(field, value)` pairs in a stable order
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let numeric = [
            ("min_h_index", self.min_h_index),
            ("max_h_index", self.max_h_index),
            ("min_academic_age", self.min_academic_age),
            ("max_academic_age", self.max_academic_age),
            ("min_articles_count", self.min_articles_count),
            ("limit", self.limit),
        ];
        let mut fields: Vec<(&'static str, String)> = numeric
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v.to_string())))
            .collect();
        if let Some(exclude) = self.exclude_coi {
            fields.push(("exclude_coi", exclude.to_string()));
        }
        fields
    }
}

/// Source document attached to an upload
#[derive(Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime_type: Option<String>,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self { file_name: file_name.into(), content: content.into(), mime_type: None }
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// MIME type, guessed from the extension when not set
    pub fn resolved_mime_type(&self) -> &str {
        if let Some(mime) = self.mime_type.as_deref() {
            return mime;
        }
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "txt" => "text/plain",
            "rtf" => "application/rtf",
            "tex" => "application/x-tex",
            _ => "application/octet-stream",
        }
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("file_name", &self.file_name)
            .field("size", &self.content.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Manuscript submission for referee matching
///
/// Authors are kept as a nested list. The multipart encoder flattens them
/// into numbered `authorN_*` fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManuscriptUploadRequest {
    pub title: String,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub filters: RefereeFilters,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, String>,
    #[serde(skip)]
    pub source_file: Option<SourceFile>,
}

impl ManuscriptUploadRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_origin_id(mut self, origin_id: impl Into<String>) -> Self {
        self.origin_id = Some(origin_id.into());
        self
    }

    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: Author) -> Self {
        self.authors.push(author);
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: RefereeFilters) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn with_custom_field(mut self, code: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_fields.insert(code.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_source_file(mut self, file: SourceFile) -> Self {
        self.source_file = Some(file);
        self
    }

    /// Build a request from flat `author_names`/`author_emails` lists
    ///
    /// Compatibility shape for callers that keep parallel lists. Missing
    /// emails are left empty.
    pub fn from_flat_authors(
        title: impl Into<String>,
        author_names: &[&str],
        author_emails: &[&str],
    ) -> Self {
        let authors = author_names
            .iter()
            .enumerate()
            .map(|(index, name)| Author {
                name: (*name).to_string(),
                email: author_emails
                    .get(index)
                    .filter(|email| !email.is_empty())
                    .map(|email| (*email).to_string()),
                orcid: None,
            })
            .collect();
        Self { title: title.into(), authors, ..Self::default() }
    }
}

/// Processing state of an uploaded manuscript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManuscriptStatus {
    Pending,
    Processing,
    Ready,
    Failed,
    #[serde(other)]
    Unknown,
}

impl_wire_enum_conversions!(ManuscriptStatus {
    Pending => "pending",
    Processing => "processing",
    Ready => "ready",
    Failed => "failed",
    Unknown => "unknown",
});

impl ManuscriptStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// Response to a manuscript upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManuscriptUploadResponse {
    #[serde(alias = "id")]
    pub manuscript_id: i64,
    #[serde(default)]
    pub origin_id: Option<String>,
    #[serde(default)]
    pub authors_count: Option<u32>,
    #[serde(default)]
    pub candidates: Vec<RefereeCandidate>,
    #[serde(default)]
    pub debug_info: Option<serde_json::Value>,
}

/// Stored manuscript as returned by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manuscript {
    #[serde(alias = "manuscript_id")]
    pub id: i64,
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub origin_id: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default = "default_status")]
    pub status: ManuscriptStatus,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub candidates: Vec<RefereeCandidate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_status() -> ManuscriptStatus {
    ManuscriptStatus::Unknown
}
