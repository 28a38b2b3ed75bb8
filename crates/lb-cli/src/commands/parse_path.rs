//! Parse-path command implementation

use anyhow::{Context, Result};
use lb_core::LandingPath;

use crate::cli::ParsePathArgs;

/// Execute the parse-path command
pub async fn execute(args: &ParsePathArgs) -> Result<()> {
    let path = LandingPath::parse(&args.path).context("Failed to parse landing path")?;
    println!("{}", serde_json::to_string_pretty(&path)?);
    Ok(())
}
