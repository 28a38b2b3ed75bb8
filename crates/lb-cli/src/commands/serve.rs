//! Serve command implementation

use anyhow::{Context, Result};
use lb_ingest::{load_secrets, EnvSecretProvider, FsLandingStore, IngestState};
use std::sync::Arc;

use crate::cli::{GlobalArgs, ServeArgs};
use crate::commands::common::{build_processor, load_config, open_configured_catalog};

/// Execute the serve command
pub async fn execute(args: &ServeArgs, global: &GlobalArgs) -> Result<()> {
    let loaded = load_config(global)?;
    let ingest = &loaded.config.ingest;

    let secrets = load_secrets(&EnvSecretProvider, &loaded.config.secrets)
        .context("Secrets are not available")?;
    log::debug!("{} secrets loaded", secrets.len());

    let landing_root = loaded.config.landing_root_absolute(&loaded.base_dir);
    let mut state = IngestState::new(Arc::new(FsLandingStore::new(&landing_root)), ingest);
    if args.process || ingest.process_inline {
        let catalog = open_configured_catalog(&loaded)?;
        log::info!(
            "Landed events are uploaded to the {} catalog, collection '{}'",
            catalog.catalog_type(),
            loaded.config.catalog.collection
        );
        state = state.with_processor(build_processor(&loaded, catalog));
    }

    let bind = args.bind.as_deref().unwrap_or(&ingest.bind);
    println!("Landing payloads under {}", landing_root.display());
    println!("Listening on http://{}/api (Ctrl+C to stop)", bind);

    lb_ingest::serve(bind, state, ingest.max_body_bytes)
        .await
        .context("Ingestion endpoint stopped")?;
    Ok(())
}
