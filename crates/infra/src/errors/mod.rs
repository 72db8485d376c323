//! Conversions from configuration errors into the SDK error type.

pub mod conversions;

pub use conversions::{InfraError, IntoSdkError};
