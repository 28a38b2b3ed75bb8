//! Error types for lb-catalog

use thiserror::Error;

/// Catalog operation errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog could not be reached or opened (C001)
    #[error("[C001] Catalog unavailable: {0}")]
    Unavailable(String),

    /// Catalog request failed (C002)
    #[error("[C002] Catalog request failed: {0}")]
    RequestFailed(String),

    /// Entity JSON rejected before it reached the catalog (C003)
    #[error("[C003] Invalid entity: {0}")]
    InvalidEntity(String),

    /// Mutex poisoned (C004)
    #[error("[C004] Catalog mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Catalog file could not be read or written (C005)
    #[error("[C005] Catalog file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Catalog file content is not valid JSON (C006)
    #[error("[C006] Catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;

impl<T> From<std::sync::PoisonError<T>> for CatalogError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        CatalogError::MutexPoisoned(err.to_string())
    }
}
