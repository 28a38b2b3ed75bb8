//! Error types for lb-ingest

use thiserror::Error;

/// Ingestion errors
#[derive(Error, Debug)]
pub enum IngestError {
    /// I001: Payload is not a gzip stream
    #[error("[I001] Payload is not valid gzip: {0}")]
    NotGzip(std::io::Error),

    /// I002: Landed file could not be written
    #[error("[I002] Failed to write landed file '{path}': {source}")]
    LandingWrite {
        path: String,
        source: std::io::Error,
    },

    /// I003: Required secrets are not available
    #[error("[I003] Missing secrets: {}", names.join(", "))]
    MissingSecret { names: Vec<String> },

    /// I004: Listener could not be bound
    #[error("[I004] Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// I005: Server stopped with an error
    #[error("[I005] Ingestion server failed: {0}")]
    Serve(std::io::Error),
}

/// Result type alias for IngestError
pub type IngestResult<T> = Result<T, IngestError>;
