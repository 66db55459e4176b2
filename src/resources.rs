//! Resource allocation cost enrichment and per-task cost rollup.
//!
//! Allocations are priced from the resource's hourly cost over the calendar
//! days they span (inclusive), assuming 8 working hours per day scaled by
//! the allocation percentage. Enriched allocations are attached to their
//! tasks; a recursive rollup then gives every task the total cost of its own
//! allocations plus all descendants'.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::task::{ResourceAllocation, ResourceCost, Task};
use crate::wbs::Wbs;

const WORKING_HOURS_PER_DAY: f64 = 8.0;

/// Rolled-up cost for one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskCostSummary {
    pub task_name: String,
    pub total_cost: f64,
}

/// Price a single allocation. Unknown resources and missing or inverted
/// date ranges price at 0.0 rather than erroring.
pub fn allocation_cost(
    alloc: &ResourceAllocation,
    costs: &HashMap<String, ResourceCost>,
) -> f64 {
    let Some(resource) = costs.get(&alloc.resource_id) else {
        return 0.0;
    };
    let days = match (alloc.start_date, alloc.end_date) {
        (Some(start), Some(end)) if end >= start => (end - start).num_days() + 1,
        _ => 0,
    };
    let hours = days as f64 * WORKING_HOURS_PER_DAY * (alloc.allocation_percent / 100.0);
    hours * resource.hourly_cost
}

/// Attach priced allocations to their tasks in the tree.
///
/// Allocations naming an unknown task are skipped with a warning.
pub fn enrich_allocations(
    wbs: &mut Wbs,
    allocations: &[ResourceAllocation],
    costs: &HashMap<String, ResourceCost>,
) {
    for alloc in allocations {
        let cost = allocation_cost(alloc, costs);
        let Some(task) = wbs.find_mut(&alloc.task_id) else {
            warn!(task_id = %alloc.task_id, "allocation references unknown task, skipping");
            continue;
        };
        let mut enriched = alloc.clone();
        enriched.calculated_cost = Some(cost);
        task.resource_allocations.push(enriched);
    }
}

/// Roll allocation costs up the tree: each task's total is its own
/// allocations plus everything below it.
pub fn summarize_costs(wbs: &Wbs) -> HashMap<String, TaskCostSummary> {
    let mut summary = HashMap::new();
    rollup(wbs.root(), &mut summary);
    summary
}

fn rollup(task: &Task, summary: &mut HashMap<String, TaskCostSummary>) -> f64 {
    let own: f64 = task
        .resource_allocations
        .iter()
        .filter_map(|a| a.calculated_cost)
        .sum();
    let children: f64 = task.subtasks.iter().map(|sub| rollup(sub, summary)).sum();
    let total = own + children;
    summary.insert(
        task.id.clone(),
        TaskCostSummary {
            task_name: task.title.clone(),
            total_cost: total,
        },
    );
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn alloc(task_id: &str, resource_id: &str, percent: f64, days: i64) -> ResourceAllocation {
        ResourceAllocation {
            task_id: task_id.into(),
            resource_id: resource_id.into(),
            allocation_percent: percent,
            start_date: Some(date(2026, 2, 1)),
            end_date: Some(date(2026, 2, 1) + chrono::Duration::days(days - 1)),
            ..ResourceAllocation::default()
        }
    }

    fn costs(entries: &[(&str, f64)]) -> HashMap<String, ResourceCost> {
        entries
            .iter()
            .map(|&(id, hourly_cost)| (id.to_string(), ResourceCost { hourly_cost }))
            .collect()
    }

    #[test]
    fn prices_full_days_at_eight_hours() {
        // 2 days * 8h * 50% * 100/h = 800
        let cost = allocation_cost(&alloc("1.1", "R1", 50.0, 2), &costs(&[("R1", 100.0)]));
        assert!((cost - 800.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_resource_prices_at_zero() {
        let cost = allocation_cost(&alloc("1.1", "R9", 100.0, 5), &costs(&[("R1", 100.0)]));
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn missing_dates_price_at_zero() {
        let mut a = alloc("1.1", "R1", 100.0, 5);
        a.end_date = None;
        assert_eq!(allocation_cost(&a, &costs(&[("R1", 100.0)])), 0.0);
    }

    #[test]
    fn enrichment_attaches_costed_allocations_and_rolls_up() {
        let mut root = Task::new("1", "root", 0);
        root.subtasks = vec![Task::new("1.1", "child", 1)];
        let mut wbs = Wbs::new(root).unwrap();

        let allocations = vec![alloc("1.1", "R1", 100.0, 1), alloc("ghost", "R1", 100.0, 1)];
        enrich_allocations(&mut wbs, &allocations, &costs(&[("R1", 10.0)]));

        let child = wbs.find("1.1").unwrap();
        assert_eq!(child.resource_allocations.len(), 1);
        assert_eq!(child.resource_allocations[0].calculated_cost, Some(80.0));

        let summary = summarize_costs(&wbs);
        assert_eq!(summary["1.1"].total_cost, 80.0);
        // Root aggregates its descendants.
        assert_eq!(summary["1"].total_cost, 80.0);
    }
}
