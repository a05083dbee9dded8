//! Error types for generator configuration.

use thiserror::Error;

/// Errors raised while loading or validating a [`GeneratorConfig`](crate::GeneratorConfig).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Width {key} must be nonzero")]
    ZeroWidth { key: &'static str },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::SerializationError(e.to_string())
    }
}
