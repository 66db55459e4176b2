//! Record types for the task tree and its collaborators.
//!
//! `Task` mirrors the on-disk task tree document: a recursive node with
//! authored metadata plus derived fields (`importance`, `urgency`, `score`,
//! `progress`) that are recomputed every run and never authored directly.
//! The remaining records cover resource allocation inputs, scheduler output
//! and workflow step definitions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::Status;

/// A node in the Work Breakdown Structure.
///
/// `deadline` is kept as the raw authored string; the scorer parses it
/// lazily so a malformed value degrades that one task instead of failing
/// the whole load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub subtasks: Vec<Task>,

    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub assigned_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default)]
    pub priority: u32,

    // Leaf scoring inputs.
    #[serde(default)]
    pub critical_path: bool,
    #[serde(default)]
    pub cost_impact: f64,
    #[serde(default)]
    pub risk_of_delay: f64,
    #[serde(default)]
    pub stakeholder_pressure: f64,

    // Three-point duration estimates, in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pessimistic_hours: Option<f64>,

    // Fields carried through part merges; opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_metrics: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_assignments: Option<serde_json::Value>,

    // Derived per run; never authored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_allocations: Vec<ResourceAllocation>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, level: u32) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            level,
            ..Task::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.subtasks.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.status == Some(Status::Completed)
    }

    /// Duration estimate in hours for the given kind, if authored.
    pub fn estimate_hours(&self, kind: crate::fields::DurationKind) -> Option<f64> {
        use crate::fields::DurationKind::*;
        match kind {
            Optimistic => self.optimistic_hours,
            Normal => self.normal_hours,
            Pessimistic => self.pessimistic_hours,
        }
    }
}

/// Links a task to a resource for part of the project timeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceAllocation {
    pub task_id: String,
    pub resource_id: String,
    #[serde(default)]
    pub allocation_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_in_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Filled by cost enrichment; absent on raw input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_cost: Option<f64>,
}

/// One leveled time window, owned by the scheduler.
///
/// `start` and `end` are hour offsets from the resource's time origin;
/// the interval is half-open `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub task_id: String,
    pub resource_id: String,
    pub start: f64,
    pub end: f64,
}

/// A workflow step definition, optionally tied to a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

/// Per-resource cost input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceCost {
    #[serde(default)]
    pub hourly_cost: f64,
}
