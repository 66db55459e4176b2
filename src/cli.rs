use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// WBS prioritization and scheduling CLI.
/// Reads JSON inputs from --input-dir and writes enriched outputs to
/// --output-dir.
#[derive(Parser)]
#[command(name = "wbs", version, about = "WBS task prioritization and scheduling engine")]
pub struct Cli {
    /// Directory containing the input JSON files.
    #[arg(long, global = true, default_value = ".")]
    pub input_dir: PathBuf,

    /// Directory where output JSON files are written.
    #[arg(long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    /// Git repository to mine for commit progress. Defaults to the input
    /// directory.
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
