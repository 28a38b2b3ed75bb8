//! lineagebridge CLI - publish Spark lineage into a data catalog

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{catalog, parse_path, process, serve, translate};

/// Install the log subscriber; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Translate(args) => translate::execute(args, &cli.global).await,
        cli::Commands::Process(args) => process::execute(args, &cli.global).await,
        cli::Commands::Serve(args) => serve::execute(args, &cli.global).await,
        cli::Commands::ParsePath(args) => parse_path::execute(args).await,
        cli::Commands::Catalog(args) => catalog::execute(args, &cli.global).await,
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match run(&cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
                return std::process::ExitCode::from(*code as u8);
            }
            eprintln!("Error: {:#}", err);
            std::process::ExitCode::FAILURE
        }
    }
}
