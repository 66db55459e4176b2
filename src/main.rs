use std::path::Path;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use wbs_engine::cli::Cli;
use wbs_engine::cmd::*;
use wbs_engine::error;

fn run(cli: Cli) -> error::Result<()> {
    let input_dir = cli.input_dir.as_path();
    let output_dir = cli.output_dir.as_path();
    let repo: &Path = cli.repo.as_deref().unwrap_or(input_dir);

    match cli.command {
        Commands::Score => cmd_score(input_dir, output_dir),
        Commands::Progress { commit_biased } => {
            cmd_progress(input_dir, output_dir, repo, commit_biased)
        }
        Commands::Schedule { duration } => cmd_schedule(input_dir, output_dir, duration),
        Commands::Run {
            commit_biased,
            duration,
        } => cmd_run(input_dir, output_dir, repo, commit_biased, duration),
        Commands::Top { count, urgency } => cmd_top(input_dir, count, urgency),
        Commands::Matrix => cmd_matrix(input_dir),
        Commands::CompleteTop { count } => cmd_complete_top(input_dir, count),
        Commands::Merge { dir } => cmd_merge(&dir, output_dir),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
