//! # Prophy Infrastructure
//!
//! Network-facing half of the Prophy SDK.
//!
//! This crate contains:
//! - HTTP transport with timeout and cancellation
//! - The authenticated API client and typed resource APIs (manuscripts,
//!   journals, author groups, custom fields, webhooks)
//! - Multipart encoding for manuscript uploads
//! - Configuration loading from environment variables and files
//! - The [`ProphyClient`] facade and the multi-tenant [`TenantRegistry`]
//!
//! ## Architecture
//! - Authentication, error classification and JWT handling come from
//!   `prophy-common`
//! - Request/response models and configuration structs come from
//!   `prophy-domain`
//! - Contains all I/O
//!
//! ## Example
//!
//! ```no_run
//! use prophy_infra::ProphyClient;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> prophy_common::SdkResult<()> {
//! let client = ProphyClient::from_env()?;
//! let fields = client.custom_fields().list(&CancellationToken::new()).await?;
//! # let _ = fields;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod tenancy;

// Re-export commonly used items
pub use api::{
    parse_event, ApiClient, AuthorGroupsApi, CustomFieldsApi, JournalsApi, ManuscriptsApi,
};
pub use client::ProphyClient;
pub use errors::IntoSdkError;
pub use http::{HttpClient, ManuscriptForm};
pub use tenancy::TenantRegistry;
