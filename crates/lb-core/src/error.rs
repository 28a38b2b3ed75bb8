//! Error types for lb-core

use thiserror::Error;

/// Core error type for lineagebridge
#[derive(Error, Debug)]
pub enum CoreError {
    /// L001: Lineage event is missing required data or is not valid JSON
    #[error("[L001] Malformed lineage event: {message}")]
    MalformedEvent { message: String },

    /// L002: Landing path does not have the expected shape
    #[error("[L002] Invalid landing path '{path}': {reason}")]
    InvalidLandingPath { path: String, reason: String },

    /// L003: Catalog entity JSON could not be materialized
    #[error("[L003] Invalid catalog entity: {message}")]
    InvalidEntity { message: String },

    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Shorthand for a [`CoreError::MalformedEvent`]
    pub fn malformed(message: impl Into<String>) -> Self {
        CoreError::MalformedEvent {
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
