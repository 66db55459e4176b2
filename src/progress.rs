//! Progress aggregation from commit history and workflow definitions.
//!
//! Two independent signals are combined per task: how often its id appears
//! in commit messages (relative to the most-referenced task), and what
//! fraction of its workflow steps are marked complete. The authored status
//! then corrects the statistical result: an explicit `completed` is always
//! believed, while a purely statistical full completion is distrusted and
//! capped.

use std::collections::HashMap;

use crate::fields::Status;
use crate::gitlog::{extract_task_ids, Commit};
use crate::task::{Task, WorkflowStep};
use crate::wbs::Wbs;

/// Weights for combining the two progress signals. Must sum to 1.
#[derive(Debug, Clone, Copy)]
pub struct ProgressWeights {
    pub commit: f64,
    pub workflow: f64,
}

impl Default for ProgressWeights {
    fn default() -> Self {
        ProgressWeights {
            commit: 0.5,
            workflow: 0.5,
        }
    }
}

impl ProgressWeights {
    /// Variant that trusts commit activity over workflow bookkeeping.
    pub fn commit_biased() -> Self {
        ProgressWeights {
            commit: 0.6,
            workflow: 0.4,
        }
    }
}

/// Count task-id occurrences across all commit messages. Repeats within a
/// single message each count.
pub fn commit_counts(commits: &[Commit]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for commit in commits {
        for id in extract_task_ids(&commit.message) {
            *counts.entry(id).or_default() += 1;
        }
    }
    counts
}

/// Relative commit progress in [0, 1]: every count divided by the maximum
/// observed count, so the most-referenced task maps to exactly 1.0.
/// No commits means no signal, not an error.
pub fn commit_progress(commits: &[Commit]) -> HashMap<String, f64> {
    let counts = commit_counts(commits);
    let Some(&max) = counts.values().max() else {
        return HashMap::new();
    };
    counts
        .into_iter()
        .map(|(id, n)| (id, n as f64 / max as f64))
        .collect()
}

/// Per-run progress state. One context per tree per run; nothing is shared
/// across invocations.
#[derive(Debug, Default)]
pub struct ProgressContext {
    commit_progress: HashMap<String, f64>,
    workflow_steps: Vec<WorkflowStep>,
    weights: ProgressWeights,
}

impl ProgressContext {
    pub fn new(
        commit_progress: HashMap<String, f64>,
        workflow_steps: Vec<WorkflowStep>,
        weights: ProgressWeights,
    ) -> Self {
        ProgressContext {
            commit_progress,
            workflow_steps,
            weights,
        }
    }

    pub fn from_commits(
        commits: &[Commit],
        workflow_steps: Vec<WorkflowStep>,
        weights: ProgressWeights,
    ) -> Self {
        Self::new(commit_progress(commits), workflow_steps, weights)
    }

    /// The normalized commit signal to persist alongside the enriched tree.
    /// Values are fractions in [0, 1].
    pub fn commit_signal_map(&self) -> &HashMap<String, f64> {
        &self.commit_progress
    }

    fn commit_signal(&self, task_id: &str) -> f64 {
        self.commit_progress.get(task_id).copied().unwrap_or(0.0)
    }

    /// Fraction of the task's workflow steps marked complete; 0 when the
    /// task has no steps.
    fn workflow_signal(&self, task_id: &str) -> f64 {
        let steps: Vec<&WorkflowStep> = self
            .workflow_steps
            .iter()
            .filter(|s| s.task_id.as_deref() == Some(task_id))
            .collect();
        if steps.is_empty() {
            return 0.0;
        }
        let done = steps.iter().filter(|s| s.completed).count();
        done as f64 / steps.len() as f64
    }

    /// Weighted combination plus the status correction.
    ///
    /// An authored `completed` forces 1.0. Any other status distrusts a
    /// statistical full completion: a combined value reaching 1.0 is capped
    /// at 0.5.
    pub fn combined(&self, task: &Task) -> f64 {
        let combined = self.weights.commit * self.commit_signal(&task.id)
            + self.weights.workflow * self.workflow_signal(&task.id);
        if task.is_completed() {
            combined.max(1.0)
        } else if combined >= 1.0 {
            0.5
        } else {
            combined
        }
    }

    /// Write `progress` onto every task in the tree, and derive a status
    /// for tasks that never had one authored (completed / in_progress /
    /// pending from the progress value). Authored statuses are untouched.
    pub fn apply(&self, wbs: &mut Wbs) {
        wbs.for_each_mut(|task| {
            let progress = self.combined(task);
            task.progress = Some(progress);
            if task.status.is_none() {
                task.status = Some(if progress >= 1.0 {
                    Status::Completed
                } else if progress > 0.0 {
                    Status::InProgress
                } else {
                    Status::Pending
                });
            }
        });
    }
}
