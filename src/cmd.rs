//! Command implementations for the CLI interface.
//!
//! Handlers are a thin boundary: load inputs from the input directory, run
//! the engine, write outputs, print a table. All scoring and scheduling
//! logic lives in the engine modules.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::warn;

use crate::error::{Error, Result};
use crate::fields::{DurationKind, Quadrant};
use crate::gitlog::{parse_git_log, run_git_log};
use crate::leveling::Leveler;
use crate::prioritize::{classify, complete_top_n, top_by_importance, top_by_urgency};
use crate::progress::{ProgressContext, ProgressWeights};
use crate::resources::{enrich_allocations, summarize_costs};
use crate::scoring::ScoringPass;
use crate::store::*;
use crate::task::{ScheduleEntry, Task};
use crate::wbs::{merge_subtasks, FlatTask, Wbs};

#[derive(Subcommand)]
pub enum Commands {
    /// Score every task (importance, urgency, composite) and write the
    /// enriched tree.
    Score,

    /// Derive per-task progress from git history and workflow state.
    Progress {
        /// Weight the commit signal 0.6/0.4 instead of the even split.
        #[arg(long)]
        commit_biased: bool,
    },

    /// Level resource allocations into sequential per-resource schedules.
    Schedule {
        /// Which three-point estimate to schedule with.
        #[arg(long, value_enum, default_value_t = DurationKind::Normal)]
        duration: DurationKind,
    },

    /// Run the full pipeline: score, progress, cost enrichment, schedule.
    Run {
        /// Weight the commit signal 0.6/0.4 instead of the even split.
        #[arg(long)]
        commit_biased: bool,
        /// Which three-point estimate to schedule with.
        #[arg(long, value_enum, default_value_t = DurationKind::Normal)]
        duration: DurationKind,
    },

    /// Show the highest-ranked tasks.
    Top {
        /// Number of tasks to show.
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Rank by urgency instead of importance.
        #[arg(long)]
        urgency: bool,
    },

    /// Show the Eisenhower importance/urgency matrix.
    Matrix,

    /// Mark the top N tasks by composite score as completed and save the
    /// updated tree back to the input directory.
    CompleteTop {
        /// Number of tasks to complete.
        #[arg(long, default_value_t = 3)]
        count: usize,
    },

    /// Merge WBS part files from a directory into a single tree.
    Merge {
        /// Directory containing the part files (every .json inside).
        dir: PathBuf,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn print_score_table(rows: &[&FlatTask]) {
    println!(
        "{:<10} {:<40} {:>6} {:>6} {:>6}",
        "ID", "TITLE", "IMP", "URG", "SCORE"
    );
    for flat in rows {
        let t = &flat.task;
        println!(
            "{:<10} {:<40} {:>6.3} {:>6.3} {:>6.3}",
            t.id,
            truncate(&t.title, 40),
            t.importance.unwrap_or(0.0),
            t.urgency.unwrap_or(0.0),
            t.score.unwrap_or(0.0),
        );
    }
}

fn load_scored_wbs(input_dir: &Path) -> Result<Wbs> {
    let mut wbs = load_wbs(&input_dir.join(WBS_FILE))?;
    ScoringPass::at_current_time().apply(&mut wbs);
    Ok(wbs)
}

fn mine_progress(
    input_dir: &Path,
    repo: &Path,
    commit_biased: bool,
) -> Result<ProgressContext> {
    let workflow = load_workflow(&input_dir.join(WORKFLOW_FILE))?;
    let log_text = run_git_log(repo).unwrap_or_default();
    let commits = parse_git_log(&log_text);
    if commits.is_empty() {
        warn!(repo = %repo.display(), "no commit history, progress uses workflow signal only");
    }
    let weights = if commit_biased {
        ProgressWeights::commit_biased()
    } else {
        ProgressWeights::default()
    };
    Ok(ProgressContext::from_commits(&commits, workflow, weights))
}

fn print_schedule_table(schedule: &[ScheduleEntry]) {
    println!(
        "{:<16} {:<10} {:>8} {:>8}",
        "RESOURCE", "TASK", "START", "END"
    );
    for entry in schedule {
        println!(
            "{:<16} {:<10} {:>8.1} {:>8.1}",
            truncate(&entry.resource_id, 16),
            entry.task_id,
            entry.start,
            entry.end,
        );
    }
}

pub fn cmd_score(input_dir: &Path, output_dir: &Path) -> Result<()> {
    let wbs = load_scored_wbs(input_dir)?;
    let flat = wbs.flatten();
    print_score_table(&top_by_importance(&flat, 10));

    let out = output_dir.join(ENRICHED_WBS_FILE);
    save_json(wbs.root(), &out)?;
    println!("Scored {} tasks -> {}", wbs.len(), out.display());
    Ok(())
}

pub fn cmd_progress(
    input_dir: &Path,
    output_dir: &Path,
    repo: &Path,
    commit_biased: bool,
) -> Result<()> {
    let mut wbs = load_wbs(&input_dir.join(WBS_FILE))?;
    let ctx = mine_progress(input_dir, repo, commit_biased)?;
    save_json(ctx.commit_signal_map(), &output_dir.join(COMMIT_PROGRESS_FILE))?;
    ctx.apply(&mut wbs);

    let out = output_dir.join(ENRICHED_WBS_FILE);
    save_json(wbs.root(), &out)?;
    let touched = wbs
        .flatten()
        .iter()
        .filter(|f| f.task.progress.is_some())
        .count();
    println!("Derived progress for {} tasks -> {}", touched, out.display());
    Ok(())
}

pub fn cmd_schedule(input_dir: &Path, output_dir: &Path, duration: DurationKind) -> Result<()> {
    let wbs = load_wbs(&input_dir.join(WBS_FILE))?;
    let allocations = load_allocations(&input_dir.join(ALLOCATIONS_FILE))?;
    let schedule = Leveler::new(duration).level(&wbs.flatten(), &allocations);
    print_schedule_table(&schedule);

    let out = output_dir.join(SCHEDULE_FILE);
    save_json(&schedule, &out)?;
    println!("Scheduled {} allocations -> {}", schedule.len(), out.display());
    Ok(())
}

pub fn cmd_run(
    input_dir: &Path,
    output_dir: &Path,
    repo: &Path,
    commit_biased: bool,
    duration: DurationKind,
) -> Result<()> {
    let mut wbs = load_scored_wbs(input_dir)?;

    let ctx = mine_progress(input_dir, repo, commit_biased)?;
    save_json(ctx.commit_signal_map(), &output_dir.join(COMMIT_PROGRESS_FILE))?;
    ctx.apply(&mut wbs);

    let allocations = load_allocations(&input_dir.join(ALLOCATIONS_FILE))?;
    let costs = load_resource_costs(&input_dir.join(RESOURCE_COSTS_FILE))?;
    enrich_allocations(&mut wbs, &allocations, &costs);
    save_json(&summarize_costs(&wbs), &output_dir.join(COST_SUMMARY_FILE))?;

    let schedule = Leveler::new(duration).level(&wbs.flatten(), &allocations);
    save_json(&schedule, &output_dir.join(SCHEDULE_FILE))?;

    let out = output_dir.join(ENRICHED_WBS_FILE);
    save_json(wbs.root(), &out)?;

    let flat = wbs.flatten();
    print_score_table(&top_by_importance(&flat, 10));
    println!(
        "Pipeline complete: {} tasks scored, {} allocations scheduled -> {}",
        wbs.len(),
        schedule.len(),
        output_dir.display()
    );
    Ok(())
}

pub fn cmd_top(input_dir: &Path, count: usize, by_urgency: bool) -> Result<()> {
    let wbs = load_scored_wbs(input_dir)?;
    let flat = wbs.flatten();
    let rows = if by_urgency {
        top_by_urgency(&flat, count)
    } else {
        top_by_importance(&flat, count)
    };
    print_score_table(&rows);
    Ok(())
}

pub fn cmd_matrix(input_dir: &Path) -> Result<()> {
    let wbs = load_scored_wbs(input_dir)?;
    let flat = wbs.flatten();
    let matrix = classify(&flat);
    for quadrant in Quadrant::ALL {
        let tasks = &matrix[&quadrant];
        println!("{} ({})", quadrant.label(), tasks.len());
        for flat in tasks {
            let t = &flat.task;
            println!(
                "  {:<10} {:<40} {:>6.3}",
                t.id,
                truncate(&t.title, 40),
                t.score.unwrap_or(0.0)
            );
        }
        println!();
    }
    Ok(())
}

pub fn cmd_complete_top(input_dir: &Path, count: usize) -> Result<()> {
    let mut wbs = load_scored_wbs(input_dir)?;
    let completed = complete_top_n(&mut wbs, count);

    let out = input_dir.join(WBS_FILE);
    save_json(wbs.root(), &out)?;
    println!("Marked {} tasks completed -> {}", completed, out.display());
    Ok(())
}

pub fn cmd_merge(dir: &Path, output_dir: &Path) -> Result<()> {
    let parts = load_wbs_parts(dir)?;
    if parts.is_empty() {
        return Err(Error::invalid_tree(
            dir.display().to_string(),
            "no .json part files found",
        ));
    }
    let count = parts.len();

    let mut merged: Vec<Task> = Vec::new();
    for part in parts {
        merged = merge_subtasks(&merged, std::slice::from_ref(&part));
    }
    let [root] = <[Task; 1]>::try_from(merged).map_err(|trees| {
        Error::invalid_tree(
            trees[1].id.clone(),
            "part files do not share a single root id",
        )
    })?;

    let wbs = Wbs::new(root)?;
    let out = output_dir.join(MERGED_WBS_FILE);
    save_json(wbs.root(), &out)?;
    println!(
        "Merged {} part files into {} tasks -> {}",
        count,
        wbs.len(),
        out.display()
    );
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;

    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
