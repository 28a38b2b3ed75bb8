//! Error types for lb-engine

use lb_catalog::{CatalogError, RejectedEntity};
use lb_core::CoreError;
use thiserror::Error;

/// Translation and upload errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed event, invalid landing path, or other input problem
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Catalog transport or storage failure
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// G001: Landed file could not be read
    #[error("[G001] Failed to read landed file '{path}': {source}")]
    ReadLanded {
        path: String,
        source: std::io::Error,
    },

    /// G002: No column correspondence policy for the application
    #[error("[G002] No column mapping policy configured for application '{application}' and no default policy set")]
    MappingPolicyMissing { application: String },

    /// G003: Catalog declined entities of the batch
    #[error("[G003] Catalog rejected {} entities uploaded to '{collection}': {}", rejected.len(), summarize(rejected))]
    UploadRejected {
        collection: String,
        rejected: Vec<RejectedEntity>,
    },

    /// G004: Column mapping could not be encoded
    #[error("[G004] Failed to encode column mapping: {0}")]
    MappingEncoding(#[from] serde_json::Error),
}

fn summarize(rejected: &[RejectedEntity]) -> String {
    rejected
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;
