//! Ranked views over the scored tree: top-N lists, Eisenhower quadrants
//! and the explicit batch-complete operation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::fields::{Quadrant, Status};
use crate::wbs::{FlatTask, Wbs};

/// Importance threshold for the Eisenhower partition.
const IMPORTANCE_THRESHOLD: f64 = 0.5;
/// Urgency threshold for the Eisenhower partition.
const URGENCY_THRESHOLD: f64 = 0.5;

fn by_desc(key: impl Fn(&FlatTask) -> f64) -> impl Fn(&&FlatTask, &&FlatTask) -> Ordering {
    move |a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal)
}

/// Top `n` tasks by importance. Stable: ties keep flatten (pre-order) order.
pub fn top_by_importance(tasks: &[FlatTask], n: usize) -> Vec<&FlatTask> {
    let mut ranked: Vec<&FlatTask> = tasks.iter().collect();
    ranked.sort_by(by_desc(|t| t.task.importance.unwrap_or(0.0)));
    ranked.truncate(n);
    ranked
}

/// Top `n` tasks by urgency. Stable: ties keep flatten (pre-order) order.
pub fn top_by_urgency(tasks: &[FlatTask], n: usize) -> Vec<&FlatTask> {
    let mut ranked: Vec<&FlatTask> = tasks.iter().collect();
    ranked.sort_by(by_desc(|t| t.task.urgency.unwrap_or(0.0)));
    ranked.truncate(n);
    ranked
}

/// The quadrant for a single importance/urgency pair.
pub fn quadrant(importance: f64, urgency: f64) -> Quadrant {
    let important = importance >= IMPORTANCE_THRESHOLD;
    let urgent = urgency >= URGENCY_THRESHOLD;
    match (urgent, important) {
        (true, true) => Quadrant::UrgentImportant,
        (true, false) => Quadrant::UrgentNotImportant,
        (false, true) => Quadrant::NotUrgentImportant,
        (false, false) => Quadrant::NotUrgentNotImportant,
    }
}

/// Partition every task into exactly one quadrant. All four quadrants are
/// present in the result, empty or not.
pub fn classify(tasks: &[FlatTask]) -> BTreeMap<Quadrant, Vec<&FlatTask>> {
    let mut matrix: BTreeMap<Quadrant, Vec<&FlatTask>> =
        Quadrant::ALL.iter().map(|&q| (q, Vec::new())).collect();
    for flat in tasks {
        let q = quadrant(
            flat.task.importance.unwrap_or(0.0),
            flat.task.urgency.unwrap_or(0.0),
        );
        matrix.entry(q).or_default().push(flat);
    }
    matrix
}

/// Mark the top `n` tasks by importance as completed with progress 1.0.
///
/// Destructive and only run on explicit request, never as a side effect of
/// scoring or classification. Tasks that are already completed keep their
/// status but still get progress forced to 1.0. Returns the number of tasks
/// newly marked completed.
pub fn complete_top_n(wbs: &mut Wbs, n: usize) -> usize {
    let flat = wbs.flatten();
    let ids: Vec<String> = top_by_importance(&flat, n)
        .into_iter()
        .map(|f| f.task.id.clone())
        .collect();

    let mut newly_completed = 0;
    for id in &ids {
        if let Some(task) = wbs.find_mut(id) {
            task.progress = Some(1.0);
            if task.status != Some(Status::Completed) {
                task.status = Some(Status::Completed);
                newly_completed += 1;
            }
        }
    }
    newly_completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn scored(id: &str, importance: f64, urgency: f64) -> Task {
        let mut t = Task::new(id, format!("Task {id}"), 1);
        t.importance = Some(importance);
        t.urgency = Some(urgency);
        t
    }

    fn tree(children: Vec<Task>) -> Wbs {
        let mut root = scored("1", 0.0, 0.0);
        root.level = 0;
        root.subtasks = children;
        Wbs::new(root).unwrap()
    }

    #[test]
    fn top_by_importance_sorts_descending() {
        let wbs = tree(vec![
            scored("1.1", 0.2, 0.0),
            scored("1.2", 0.9, 0.0),
            scored("1.3", 0.5, 0.0),
        ]);
        let flat = wbs.flatten();
        let top: Vec<&str> = top_by_importance(&flat, 2)
            .iter()
            .map(|f| f.task.id.as_str())
            .collect();
        assert_eq!(top, vec!["1.2", "1.3"]);
    }

    #[test]
    fn ties_keep_original_order() {
        let wbs = tree(vec![
            scored("1.1", 0.7, 0.0),
            scored("1.2", 0.7, 0.0),
            scored("1.3", 0.7, 0.0),
        ]);
        let flat = wbs.flatten();
        let top: Vec<&str> = top_by_importance(&flat, 3)
            .iter()
            .map(|f| f.task.id.as_str())
            .collect();
        assert_eq!(top, vec!["1.1", "1.2", "1.3"]);
    }

    #[test]
    fn top_by_urgency_uses_the_urgency_axis() {
        let wbs = tree(vec![scored("1.1", 0.9, 0.1), scored("1.2", 0.1, 0.9)]);
        let flat = wbs.flatten();
        let top = top_by_urgency(&flat, 1);
        assert_eq!(top[0].task.id, "1.2");
    }

    #[test]
    fn classification_partitions_every_task_exactly_once() {
        let wbs = tree(vec![
            scored("1.1", 0.9, 0.9),
            scored("1.2", 0.1, 0.9),
            scored("1.3", 0.9, 0.1),
            scored("1.4", 0.1, 0.1),
        ]);
        let flat = wbs.flatten();
        let matrix = classify(&flat);

        assert_eq!(matrix.len(), 4);
        let total: usize = matrix.values().map(Vec::len).sum();
        assert_eq!(total, flat.len());

        let find = |id: &str| {
            Quadrant::ALL
                .iter()
                .filter(|q| matrix[q].iter().any(|f| f.task.id == id))
                .count()
        };
        for id in ["1", "1.1", "1.2", "1.3", "1.4"] {
            assert_eq!(find(id), 1, "task {id} must land in exactly one quadrant");
        }
    }

    #[test]
    fn threshold_boundary_counts_as_urgent_and_important() {
        assert_eq!(quadrant(0.5, 0.5), Quadrant::UrgentImportant);
        assert_eq!(quadrant(0.49, 0.5), Quadrant::UrgentNotImportant);
        assert_eq!(quadrant(0.5, 0.49), Quadrant::NotUrgentImportant);
    }

    #[test]
    fn complete_top_n_marks_status_and_forces_progress() {
        let mut wbs = tree(vec![scored("1.1", 0.9, 0.0), scored("1.2", 0.2, 0.0)]);
        let newly = complete_top_n(&mut wbs, 1);
        assert_eq!(newly, 1);
        let done = wbs.find("1.1").unwrap();
        assert_eq!(done.status, Some(Status::Completed));
        assert_eq!(done.progress, Some(1.0));
        assert_ne!(wbs.find("1.2").unwrap().status, Some(Status::Completed));
    }

    #[test]
    fn already_completed_tasks_keep_status_but_get_progress_forced() {
        let mut done = scored("1.1", 0.9, 0.0);
        done.status = Some(Status::Completed);
        done.progress = Some(0.3);
        let mut wbs = tree(vec![done]);
        let newly = complete_top_n(&mut wbs, 1);
        assert_eq!(newly, 0);
        assert_eq!(wbs.find("1.1").unwrap().progress, Some(1.0));
    }
}
