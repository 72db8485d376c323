//! Conversions from infrastructure-side errors into [`SdkError`].

use prophy_common::error::SdkError;
use prophy_domain::ConfigError;
use thiserror::Error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted into the SDK error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub SdkError);

impl From<InfraError> for SdkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ConfigError> for InfraError {
    fn from(value: ConfigError) -> Self {
        InfraError(value.into_sdk())
    }
}

/// Conversion into [`SdkError`] for foreign error types.
pub trait IntoSdkError {
    fn into_sdk(self) -> SdkError;
}

/* -------------------------------------------------------------------------- */
/* ConfigError → SdkError */
/* -------------------------------------------------------------------------- */

impl IntoSdkError for ConfigError {
    fn into_sdk(self) -> SdkError {
        match self {
            ConfigError::Missing(field) => SdkError::invalid_argument(field, "is required"),
            ConfigError::Invalid { field, message } => SdkError::invalid_argument(field, message),
            other @ (ConfigError::NotFound(_) | ConfigError::Io { .. } | ConfigError::Parse { .. }) => {
                SdkError::invalid_operation(other.to_string())
            }
        }
    }
}
