//! Greedy per-resource leveling.
//!
//! Each resource gets a running cursor starting at 0; its tasks are placed
//! back to back in allocation input order, so two tasks sharing a resource
//! can never overlap. This is deliberately not an optimizer: there is no
//! backfilling and no balancing across resources.

use std::collections::HashMap;

use tracing::warn;

use crate::fields::DurationKind;
use crate::task::{ResourceAllocation, ScheduleEntry};
use crate::wbs::FlatTask;

/// Duration assumed when a task carries no estimate for the chosen kind.
const DEFAULT_DURATION_HOURS: f64 = 1.0;

/// Resource leveler configured with the estimate kind to read.
#[derive(Debug, Clone, Copy, Default)]
pub struct Leveler {
    pub duration: DurationKind,
}

impl Leveler {
    pub fn new(duration: DurationKind) -> Self {
        Leveler { duration }
    }

    /// Assign non-overlapping `[start, end)` windows per resource.
    ///
    /// Resources are processed in first-seen order and each resource's tasks
    /// in allocation input order, so output is deterministic for a given
    /// input. Allocations naming an unknown task are skipped with a warning.
    pub fn level(
        &self,
        tasks: &[FlatTask],
        allocations: &[ResourceAllocation],
    ) -> Vec<ScheduleEntry> {
        let task_map: HashMap<&str, &FlatTask> =
            tasks.iter().map(|f| (f.task.id.as_str(), f)).collect();

        // Group by resource, preserving both resource first-seen order and
        // per-resource allocation order.
        let mut resource_order: Vec<&str> = Vec::new();
        let mut by_resource: HashMap<&str, Vec<&ResourceAllocation>> = HashMap::new();
        for alloc in allocations {
            let entry = by_resource.entry(alloc.resource_id.as_str()).or_default();
            if entry.is_empty() {
                resource_order.push(alloc.resource_id.as_str());
            }
            entry.push(alloc);
        }

        let mut schedule = Vec::new();
        for resource_id in resource_order {
            let mut cursor = 0.0;
            for alloc in &by_resource[resource_id] {
                let Some(flat) = task_map.get(alloc.task_id.as_str()) else {
                    warn!(
                        task_id = %alloc.task_id,
                        resource_id = %resource_id,
                        "allocation references unknown task, skipping"
                    );
                    continue;
                };
                let duration = flat
                    .task
                    .estimate_hours(self.duration)
                    .unwrap_or(DEFAULT_DURATION_HOURS);
                let start = cursor;
                let end = start + duration;
                schedule.push(ScheduleEntry {
                    task_id: alloc.task_id.clone(),
                    resource_id: resource_id.to_string(),
                    start,
                    end,
                });
                cursor = end;
            }
        }
        schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use crate::wbs::Wbs;

    fn tree_with(estimates: &[(&str, Option<f64>)]) -> Vec<FlatTask> {
        let mut root = Task::new("0", "root", 0);
        for (id, hours) in estimates {
            let mut t = Task::new(*id, format!("Task {id}"), 1);
            t.normal_hours = *hours;
            root.subtasks.push(t);
        }
        Wbs::new(root).unwrap().flatten()
    }

    fn alloc(task_id: &str, resource_id: &str) -> ResourceAllocation {
        ResourceAllocation {
            task_id: task_id.into(),
            resource_id: resource_id.into(),
            allocation_percent: 100.0,
            ..ResourceAllocation::default()
        }
    }

    #[test]
    fn tasks_on_one_resource_are_placed_back_to_back() {
        let tasks = tree_with(&[("A", Some(3.0)), ("B", Some(2.0))]);
        let schedule =
            Leveler::default().level(&tasks, &[alloc("A", "R1"), alloc("B", "R1")]);
        assert_eq!(schedule.len(), 2);
        assert_eq!((schedule[0].start, schedule[0].end), (0.0, 3.0));
        assert_eq!((schedule[1].start, schedule[1].end), (3.0, 5.0));
    }

    #[test]
    fn intervals_sharing_a_resource_never_overlap() {
        let tasks = tree_with(&[
            ("A", Some(4.0)),
            ("B", None),
            ("C", Some(2.5)),
            ("D", Some(1.0)),
        ]);
        let allocations = vec![
            alloc("A", "R1"),
            alloc("B", "R2"),
            alloc("C", "R1"),
            alloc("D", "R1"),
        ];
        let schedule = Leveler::default().level(&tasks, &allocations);
        for a in &schedule {
            for b in &schedule {
                if std::ptr::eq(a, b) || a.resource_id != b.resource_id {
                    continue;
                }
                assert!(
                    a.end <= b.start || b.end <= a.start,
                    "overlap between {} and {} on {}",
                    a.task_id,
                    b.task_id,
                    a.resource_id
                );
            }
        }
    }

    #[test]
    fn missing_estimate_defaults_to_one_hour() {
        let tasks = tree_with(&[("A", None)]);
        let schedule = Leveler::default().level(&tasks, &[alloc("A", "R1")]);
        assert_eq!((schedule[0].start, schedule[0].end), (0.0, 1.0));
    }

    #[test]
    fn unknown_task_is_skipped_without_advancing_the_cursor() {
        let tasks = tree_with(&[("A", Some(2.0))]);
        let schedule =
            Leveler::default().level(&tasks, &[alloc("ghost", "R1"), alloc("A", "R1")]);
        assert_eq!(schedule.len(), 1);
        assert_eq!((schedule[0].start, schedule[0].end), (0.0, 2.0));
    }

    #[test]
    fn each_resource_gets_its_own_cursor() {
        let tasks = tree_with(&[("A", Some(3.0)), ("B", Some(2.0))]);
        let schedule =
            Leveler::default().level(&tasks, &[alloc("A", "R1"), alloc("B", "R2")]);
        assert_eq!(schedule[0].start, 0.0);
        assert_eq!(schedule[1].start, 0.0);
    }

    #[test]
    fn estimate_kind_selects_the_three_point_column() {
        let mut root = Task::new("0", "root", 0);
        let mut t = Task::new("A", "Task A", 1);
        t.optimistic_hours = Some(1.0);
        t.normal_hours = Some(2.0);
        t.pessimistic_hours = Some(4.0);
        root.subtasks.push(t);
        let tasks = Wbs::new(root).unwrap().flatten();

        let schedule =
            Leveler::new(DurationKind::Pessimistic).level(&tasks, &[alloc("A", "R1")]);
        assert_eq!(schedule[0].end, 4.0);
    }
}
