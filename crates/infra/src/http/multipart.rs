//! Multipart encoding for manuscript uploads
//!
//! The upload endpoint takes flat form fields. Nested authors become
//! `authors_count` plus `author{N}_name`, `author{N}_email` and
//! `author{N}_orcid` (1-based). Custom fields are sent under their code.

use prophy_common::error::{SdkError, SdkResult};
use prophy_domain::constants::{MAX_UPLOAD_BYTES, SOURCE_FILE_FIELD};
use prophy_domain::{ManuscriptUploadRequest, SourceFile};
use reqwest::multipart::{Form, Part};

const RESERVED_PREFIXES: &[&str] = &["author", "title", "abstract", "origin_id", "folder", "language"];

/// Validated, flattened upload form
#[derive(Debug, Clone)]
pub struct ManuscriptForm {
    fields: Vec<(String, String)>,
    file: SourceFile,
}

impl ManuscriptForm {
    /// Flatten and validate an upload request
    ///
    /// # Errors
    /// `InvalidArgument` when the title, source file or an author name is
    /// missing, the file exceeds the upload limit, or a custom field code
    /// collides with a built-in field.
    pub fn from_request(request: &ManuscriptUploadRequest) -> SdkResult<Self> {
        SdkError::require_non_empty("title", &request.title)?;

        let file = request
            .source_file
            .clone()
            .ok_or_else(|| SdkError::invalid_argument(SOURCE_FILE_FIELD, "a source file is required"))?;
        SdkError::require_non_empty("source_file.file_name", &file.file_name)?;
        if file.content.is_empty() {
            return Err(SdkError::invalid_argument(SOURCE_FILE_FIELD, "file is empty"));
        }
        if file.content.len() > MAX_UPLOAD_BYTES {
            return Err(SdkError::invalid_argument(
                SOURCE_FILE_FIELD,
                format!("file exceeds {MAX_UPLOAD_BYTES} bytes"),
            ));
        }

        let mut fields = vec![("title".to_string(), request.title.trim().to_string())];
        let optional = [
            ("abstract", &request.abstract_text),
            ("origin_id", &request.origin_id),
            ("folder", &request.folder),
            ("language", &request.language),
        ];
        for (name, value) in optional {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                fields.push((name.to_string(), value.to_string()));
            }
        }

        if !request.authors.is_empty() {
            fields.push(("authors_count".to_string(), request.authors.len().to_string()));
        }
        for (index, author) in request.authors.iter().enumerate() {
            let n = index + 1;
            if author.name.trim().is_empty() {
                return Err(SdkError::invalid_argument(
                    format!("authors[{index}].name"),
                    "must not be empty",
                ));
            }
            fields.push((format!("author{n}_name"), author.name.trim().to_string()));
            if let Some(email) = author.email.as_deref().filter(|e| !e.trim().is_empty()) {
                fields.push((format!("author{n}_email"), email.trim().to_string()));
            }
            if let Some(orcid) = author.orcid.as_deref().filter(|o| !o.trim().is_empty()) {
                fields.push((format!("author{n}_orcid"), orcid.trim().to_string()));
            }
        }

        fields.extend(
            request.filters.to_fields().into_iter().map(|(name, value)| (name.to_string(), value)),
        );

        for (code, value) in &request.custom_fields {
            let reserved = code == SOURCE_FILE_FIELD
                || RESERVED_PREFIXES.iter().any(|prefix| code.starts_with(prefix))
                || fields.iter().any(|(name, _)| name == code);
            if code.trim().is_empty() || reserved {
                return Err(SdkError::invalid_argument(
                    format!("custom_fields.{code}"),
                    "code is empty or collides with a built-in field",
                ));
            }
            fields.push((code.clone(), value.clone()));
        }

        Ok(Self { fields, file })
    }

    /// Text fields in send order
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Value of a text field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    /// Convert into a `reqwest` multipart form
    ///
    /// # Errors
    /// `InvalidArgument` when the file MIME type is not parseable.
    pub fn into_multipart(self) -> SdkResult<Form> {
        let mime = self.file.resolved_mime_type().to_string();
        let part = Part::bytes(self.file.content)
            .file_name(self.file.file_name)
            .mime_str(&mime)
            .map_err(|err| SdkError::invalid_argument("source_file.mime_type", err.to_string()))?;

        let form = self
            .fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        Ok(form.part(SOURCE_FILE_FIELD, part))
    }
}
