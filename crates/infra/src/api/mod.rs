//! Prophy REST API
//!
//! [`ApiClient`] owns transport, authentication and error classification.
//! The resource APIs are thin typed wrappers sharing one client.
//!
//! # Architecture
//!
//! - `X-ApiKey` attached to every request
//! - One attempt per call; callers decide on retries from the error
//! - Every network call takes a `CancellationToken`

pub mod author_groups;
pub mod client;
pub mod custom_fields;
pub mod journals;
pub mod manuscripts;
pub mod webhooks;

pub use author_groups::AuthorGroupsApi;
pub use client::ApiClient;
pub use custom_fields::{check_values, CustomFieldsApi};
pub use journals::JournalsApi;
pub use manuscripts::ManuscriptsApi;
pub use webhooks::{parse_event, parse_event_bytes};
