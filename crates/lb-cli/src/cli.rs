//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// lineagebridge - Publish Spark lineage into a data catalog
#[derive(Parser, Debug)]
#[command(name = "lb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding lineagebridge.yml; relative paths resolve against it
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path (also read from LB_CONFIG)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a lineage event into catalog entities without uploading
    Translate(TranslateArgs),

    /// Translate landed event files and upload them to the catalog
    Process(ProcessArgs),

    /// Run the HTTP ingestion endpoint
    Serve(ServeArgs),

    /// Parse a landing path and print its components
    ParsePath(ParsePathArgs),

    /// Inspect or seed the file catalog
    Catalog(CatalogArgs),
}

/// Arguments for the translate command
#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Lineage event JSON file
    pub event: String,

    /// Resolve against this catalog file instead of the configured catalog
    #[arg(long)]
    pub catalog: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: TranslateOutput,
}

/// Translate output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateOutput {
    /// Entity batch as catalog JSON
    Json,
    /// One line per entity plus counts
    Summary,
}

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Landed event files
    #[arg(required = true)]
    pub files: Vec<String>,
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Socket address to bind (overrides ingest.bind)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Translate and upload each landed event right away
    #[arg(long)]
    pub process: bool,
}

/// Arguments for the parse-path command
#[derive(Args, Debug)]
pub struct ParsePathArgs {
    /// Landing path, e.g. landingzone/spline/application=RAP/date=2024-03-01/file.json
    pub path: String,
}

/// Arguments for the catalog command
#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

/// Catalog subcommands
#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Load existing entities into the catalog file
    Seed(CatalogSeedArgs),

    /// Print the stored entities
    Show(CatalogShowArgs),
}

/// Arguments for catalog seed
#[derive(Args, Debug)]
pub struct CatalogSeedArgs {
    /// JSON file holding an entity list or an {"entities": [...]} envelope
    pub file: String,
}

/// Arguments for catalog show
#[derive(Args, Debug)]
pub struct CatalogShowArgs {
    /// Only show entities of this type
    #[arg(long = "type")]
    pub type_name: Option<String>,

    /// Only show entities uploaded into this collection
    #[arg(long)]
    pub collection: Option<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
