//! lb-catalog - Catalog abstraction layer for lineagebridge
//!
//! This crate provides the `Catalog` trait (discovery query, entity fetch,
//! batch upload) and two implementations: a process-local in-memory catalog
//! and a JSON-file catalog built on top of it.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{CatalogError, CatalogResult};
pub use file::JsonFileCatalog;
pub use memory::{CallStats, InMemoryCatalog, StoredEntity};
pub use traits::{
    Catalog, FilterOperator, QueryFilter, RejectedEntity, SearchResult, UploadResult,
};

use lb_core::{CatalogBackend, CatalogConfig};
use std::path::Path;
use std::sync::Arc;

/// Open the catalog backend selected in the configuration.
///
/// Relative file paths are resolved against `base_dir`.
pub fn open_catalog(config: &CatalogConfig, base_dir: &Path) -> CatalogResult<Arc<dyn Catalog>> {
    let catalog: Arc<dyn Catalog> = match config.backend {
        CatalogBackend::Memory => Arc::new(InMemoryCatalog::new()),
        CatalogBackend::File => Arc::new(JsonFileCatalog::open(&base_dir.join(&config.path))?),
    };
    log::debug!("Opened {} catalog", catalog.catalog_type());
    Ok(catalog)
}
