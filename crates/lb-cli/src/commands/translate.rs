//! Translate command implementation

use anyhow::{Context, Result};
use lb_catalog::{Catalog, JsonFileCatalog};
use lb_core::LineageEvent;
use lb_engine::AssembledBatch;
use std::path::Path;
use std::sync::Arc;

use crate::cli::{GlobalArgs, TranslateArgs, TranslateOutput};
use crate::commands::common::{build_assembler, load_config, open_configured_catalog};

/// Execute the translate command
pub async fn execute(args: &TranslateArgs, global: &GlobalArgs) -> Result<()> {
    let loaded = load_config(global)?;

    let raw = std::fs::read(&args.event)
        .with_context(|| format!("Failed to read event file {}", args.event))?;
    let event = LineageEvent::from_slice(&raw)
        .with_context(|| format!("Invalid lineage event in {}", args.event))?;

    let catalog: Arc<dyn Catalog> = match &args.catalog {
        Some(path) => Arc::new(
            JsonFileCatalog::open(Path::new(path))
                .with_context(|| format!("Failed to open catalog file {}", path))?,
        ),
        None => open_configured_catalog(&loaded)?,
    };

    let batch = build_assembler(&loaded, catalog)
        .assemble(&event)
        .await
        .with_context(|| format!("Failed to translate process '{}'", event.process_name))?;

    match args.output {
        TranslateOutput::Json => {
            println!("{}", serde_json::to_string_pretty(&batch.entities())?);
        }
        TranslateOutput::Summary => print_summary(&batch),
    }
    Ok(())
}

fn print_summary(batch: &AssembledBatch) {
    for entity in batch.entities() {
        println!(
            "{:<8} {:<34} {:>8}  {}",
            entity.kind.to_string(),
            entity.type_name,
            entity.guid.to_string(),
            entity.qualified_name
        );
    }
    let summary = batch.summary();
    println!();
    println!(
        "{} tables ({} resolved), {} columns, {} process",
        summary.tables, summary.resolved, summary.columns, summary.processes
    );
    println!(
        "Column mapping: {} -> {} ({} pairs)",
        batch.mapping.dataset_mapping.source,
        batch.mapping.dataset_mapping.sink,
        batch.mapping.column_mapping.len()
    );
}
