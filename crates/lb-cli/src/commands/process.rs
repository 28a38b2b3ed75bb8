//! Process command implementation

use anyhow::Result;
use std::path::Path;

use crate::cli::{GlobalArgs, ProcessArgs};
use crate::commands::common::{build_processor, load_config, open_configured_catalog, ExitCode};

/// Execute the process command
pub async fn execute(args: &ProcessArgs, global: &GlobalArgs) -> Result<()> {
    let loaded = load_config(global)?;
    let catalog = open_configured_catalog(&loaded)?;
    let processor = build_processor(&loaded, catalog);

    let mut failures = 0;
    for file in &args.files {
        match processor.process_file(Path::new(file)).await {
            Ok(Some(outcome)) => println!(
                "  ok    {} -> {} ({} stored, {} unchanged)",
                file,
                outcome.process_qualified_name,
                outcome.upload.stored.len(),
                outcome.upload.unchanged.len()
            ),
            Ok(None) => println!("  skip  {} (empty)", file),
            Err(e) => {
                failures += 1;
                println!("  fail  {}", file);
                eprintln!("        {}", e);
            }
        }
    }

    println!();
    println!(
        "Processed {} files into '{}': {} failed",
        args.files.len(),
        processor.collection(),
        failures
    );
    if failures > 0 {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
