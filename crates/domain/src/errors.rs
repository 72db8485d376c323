//! Error types for configuration and model validation

use thiserror::Error;

/// Configuration problems detected while loading or validating settings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid { field: field.into(), message: message.into() }
    }

    /// Name of the setting at fault, if the error is about one setting
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Missing(field) | Self::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
