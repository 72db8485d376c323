//! # Prophy Domain
//!
//! Data types shared across the Prophy SDK.
//!
//! This crate contains:
//! - API request/response models (manuscripts, referees, journals, author
//!   groups, custom fields, webhooks)
//! - SDK configuration structures and their validation errors
//! - Default URLs, header names and endpoint paths
//!
//! ## Architecture
//! - No dependencies on other Prophy crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
