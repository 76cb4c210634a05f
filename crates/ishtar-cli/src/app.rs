//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ishtar")]
#[command(
    author,
    version,
    about = "Retrieval-augmented answers over humanitarian news and reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to $ISHTAR_CONFIG or the user config dir)
    #[arg(long, global = true, env = "ISHTAR_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest raw records from JSON files and feed URLs
    Ingest(IngestArgs),

    /// Retrieve the nearest documents for a query
    Search(SearchArgs),

    /// Answer a question from the indexed documents
    Ask(AskArgs),

    /// Show index and backend status
    Status,

    /// Liveness check
    Health,

    /// Start MCP server
    Mcp,
}

#[derive(Args)]
pub struct IngestArgs {
    /// JSON array or JSON-lines files of raw records
    pub files: Vec<PathBuf>,

    /// Feed URLs serving a JSON array of raw records
    #[arg(long = "url")]
    pub urls: Vec<String>,

    /// Documents embedded and upserted together
    #[arg(short, long)]
    pub batch_size: Option<usize>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of results
    #[arg(short = 'k')]
    pub k: Option<usize>,

    /// Show document text
    #[arg(long)]
    pub full: bool,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of context documents
    #[arg(short = 'k')]
    pub k: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
    Csv,
    Md,
}
