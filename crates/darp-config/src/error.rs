//! Error types for settings handling.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, saving or editing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file or its directory could not be written.
    #[error("failed to write config file '{}': {source}", path.display())]
    Write {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for the settings schema.
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Settings could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The settings parsed but failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// A dotted key does not name a setting.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    /// A value could not be converted to the setting's type.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue {
        /// The dotted key being set.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create a validation error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Create an invalid value error.
    #[must_use]
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
