//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use lb_catalog::{open_catalog, Catalog, JsonFileCatalog};
use lb_core::Config;
use lb_engine::{GraphAssembler, GuidAllocator, LandingProcessor};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main prints nothing for it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Configuration plus the directory relative paths resolve against
pub(crate) struct Loaded {
    pub(crate) config: Config,
    pub(crate) base_dir: PathBuf,
}

/// Load the configuration selected by the global arguments.
///
/// `--config` (or `LB_CONFIG`) names the file explicitly; otherwise the
/// project directory is searched and built-in defaults apply if nothing is
/// found.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Loaded> {
    let base_dir = PathBuf::from(&global.project_dir);
    let config = match Config::resolve_path(global.config.as_deref()) {
        Some(path) => {
            Config::load(Path::new(&path)).with_context(|| format!("Failed to load config {}", path))?
        }
        None => Config::load_from_dir_or_default(&base_dir).context("Failed to load config")?,
    };
    if global.verbose {
        log::debug!(
            "Using {} catalog, collection '{}'",
            config.catalog.backend,
            config.catalog.collection
        );
    }
    Ok(Loaded { config, base_dir })
}

/// Open the catalog backend selected in the configuration
pub(crate) fn open_configured_catalog(loaded: &Loaded) -> Result<Arc<dyn Catalog>> {
    open_catalog(&loaded.config.catalog, &loaded.base_dir).context("Failed to open catalog")
}

/// Open the configured catalog file regardless of the selected backend
pub(crate) fn open_catalog_file(loaded: &Loaded) -> Result<JsonFileCatalog> {
    let path = loaded.config.catalog_path_absolute(&loaded.base_dir);
    JsonFileCatalog::open(&path)
        .with_context(|| format!("Failed to open catalog file {}", path.display()))
}

/// Assembler wired to a catalog with the configured settings and policies
pub(crate) fn build_assembler(loaded: &Loaded, catalog: Arc<dyn Catalog>) -> GraphAssembler {
    GraphAssembler::from_config(
        &loaded.config,
        catalog,
        Arc::new(GuidAllocator::new(loaded.config.engine.guid_start)),
    )
}

/// Landing processor uploading into the configured collection
pub(crate) fn build_processor(loaded: &Loaded, catalog: Arc<dyn Catalog>) -> LandingProcessor {
    LandingProcessor::new(
        build_assembler(loaded, catalog),
        loaded.config.catalog.collection.clone(),
        loaded.config.landing_root_absolute(&loaded.base_dir),
    )
}
