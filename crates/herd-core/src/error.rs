//! Error types for herd-core

use thiserror::Error;

/// Core error type for the herd pipeline
#[derive(Error, Debug)]
pub enum CoreError {
    /// H001: Configuration file not found
    #[error("[H001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// H002: Failed to parse configuration file
    #[error("[H002] Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// H003: Invalid configuration value
    #[error("[H003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// H004: IO error with file path context
    #[error("[H004] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
