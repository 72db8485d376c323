//! Shared building blocks for the Prophy SDK crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error taxonomy, HTTP error classification, clocks
//! - `runtime`: AES-256-GCM encryption and the authentication stack (API key,
//!   JWT issue/validate, PKCE, OAuth grant flows, encrypted token storage)
//! - `test-utils`: exposes [`time::MockClock`] helpers to downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod time;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod auth;
#[cfg(feature = "runtime")]
pub mod cancel;
#[cfg(feature = "runtime")]
pub mod crypto;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cancel::run_cancellable;
#[cfg(feature = "runtime")]
pub use crypto::{EncryptedData, EncryptionService};
#[cfg(feature = "foundation")]
pub use error::{
    ErrorCategory, ErrorClassification, ErrorClassifier, ErrorSeverity, ResponseContext,
    SdkError, SdkResult,
};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
