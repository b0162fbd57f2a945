//! Core error types for signalroom-core.
//!
//! The pipeline stages themselves are infallible: missing or malformed fields
//! degrade to "rule does not apply". Errors here cover caller mistakes
//! (unknown intent mode, unknown provider) and the configuration layer.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for signalroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The caller asked for an intent mode that does not exist
    #[error("Invalid intent mode '{value}' (expected one of: calm, on_the_go, work, focus)")]
    InvalidMode { value: String },

    /// A payload was tagged with a provider the adapters do not know
    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),

    /// A native provider payload could not be decoded
    #[error("Malformed payload from '{provider}': {source}")]
    Payload {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
