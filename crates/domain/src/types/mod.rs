//! API request and response models

pub mod author_group;
pub mod custom_field;
pub mod journal;
pub mod manuscript;
pub mod referee;
pub mod webhook;

pub use author_group::{
    AuthorGroup, CreateAuthorGroupRequest, GroupAuthor, Page, PageRequest,
    UpdateAuthorGroupRequest,
};
pub use custom_field::{CustomField, CustomFieldOption, CustomFieldType};
pub use journal::{JournalRecommendation, JournalRecommendationsResponse};
pub use manuscript::{
    Author, Manuscript, ManuscriptStatus, ManuscriptUploadRequest, ManuscriptUploadResponse,
    RefereeFilters, SourceFile,
};
pub use referee::{RefereeCandidate, RefereeStatus};
pub use webhook::WebhookEvent;
