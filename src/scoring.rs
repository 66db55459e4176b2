//! Importance/urgency scoring over the task tree.
//!
//! Leaves are scored from normalized features; parents take the arithmetic
//! mean of their children (post-order), so every score stays on the
//! canonical [0, 1] scale and a parent always lies inside the envelope of
//! its children. A single malformed task degrades to a neutral default
//! instead of aborting the pass.

use std::collections::HashMap;

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::task::Task;
use crate::wbs::Wbs;

/// Deadline lookahead window for the urgency time factor.
const URGENCY_WINDOW_SECS: f64 = 3.0 * 24.0 * 3600.0;

/// Neutral score used when feature extraction fails for a task.
const FALLBACK_SCORE: f64 = 0.5;

/// Composite ranking score.
pub fn composite(importance: f64, urgency: f64) -> f64 {
    0.6 * importance + 0.4 * urgency
}

/// One scoring pass over one tree.
///
/// Holds the memoization cache, so a subtree requested from several report
/// paths is computed at most once. Passes are never shared across trees or
/// runs; construct a fresh one each time.
#[derive(Debug)]
pub struct ScoringPass {
    now: NaiveDateTime,
    cache: HashMap<String, (f64, f64)>,
}

impl ScoringPass {
    /// A pass anchored at an explicit point in time. Tests and replays use
    /// this; production callers use [`ScoringPass::at_current_time`].
    pub fn new(now: NaiveDateTime) -> Self {
        ScoringPass {
            now,
            cache: HashMap::new(),
        }
    }

    pub fn at_current_time() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// Score a task and its whole subtree, returning `(importance, urgency)`.
    pub fn score(&mut self, task: &Task) -> (f64, f64) {
        if let Some(&cached) = self.cache.get(&task.id) {
            return cached;
        }
        let scores = if task.is_leaf() {
            match self.leaf_scores(task) {
                Ok(scores) => scores,
                Err(reason) => {
                    warn!(task_id = %task.id, %reason, "scoring fell back to neutral default");
                    (FALLBACK_SCORE, FALLBACK_SCORE)
                }
            }
        } else {
            let mut importance_sum = 0.0;
            let mut urgency_sum = 0.0;
            for sub in &task.subtasks {
                let (imp, urg) = self.score(sub);
                importance_sum += imp;
                urgency_sum += urg;
            }
            let n = task.subtasks.len() as f64;
            (importance_sum / n, urgency_sum / n)
        };
        self.cache.insert(task.id.clone(), scores);
        scores
    }

    /// Score the whole tree and write `importance`, `urgency` and the
    /// composite `score` onto every node.
    pub fn apply(&mut self, wbs: &mut Wbs) {
        self.score(wbs.root());
        let cache = std::mem::take(&mut self.cache);
        wbs.for_each_mut(|task| {
            if let Some(&(importance, urgency)) = cache.get(&task.id) {
                task.importance = Some(importance);
                task.urgency = Some(urgency);
                task.score = Some(composite(importance, urgency));
            }
        });
        self.cache = cache;
    }

    fn leaf_scores(&self, task: &Task) -> Result<(f64, f64), String> {
        let dependency_factor = (task.dependencies.len() as f64 / 10.0).clamp(0.0, 1.0);
        let critical_path_factor = if task.critical_path { 1.0 } else { 0.0 };
        let cost_factor = (task.cost_impact / 100_000.0).clamp(0.0, 1.0);
        let priority_factor = (task.priority as f64 / 10.0).clamp(0.0, 1.0);
        let importance = 0.3 * dependency_factor
            + 0.3 * critical_path_factor
            + 0.2 * cost_factor
            + 0.2 * priority_factor;

        let time_factor = match task.deadline.as_deref() {
            None => 0.0,
            Some(raw) => {
                let deadline = parse_deadline(raw)
                    .ok_or_else(|| format!("unparseable deadline '{raw}'"))?;
                let remaining = (deadline - self.now).num_seconds() as f64;
                1.0 - (remaining / URGENCY_WINDOW_SECS).clamp(0.0, 1.0)
            }
        };
        let risk_factor = (task.risk_of_delay / 10.0).clamp(0.0, 1.0);
        let pressure_factor = (task.stakeholder_pressure / 10.0).clamp(0.0, 1.0);
        let urgency = 0.5 * time_factor + 0.3 * risk_factor + 0.2 * pressure_factor;

        Ok((importance, urgency))
    }
}

/// Parse an authored deadline: full ISO date-time or bare date (midnight).
fn parse_deadline(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn leaf(id: &str, level: u32) -> Task {
        Task::new(id, format!("Task {id}"), level)
    }

    #[test]
    fn leaf_importance_follows_weighted_features() {
        let mut task = leaf("1.1", 1);
        task.dependencies = vec!["a".into(), "b".into(), "c".into()];
        task.critical_path = true;
        task.cost_impact = 50_000.0;
        task.priority = 5;

        let mut pass = ScoringPass::new(fixed_now());
        let (importance, _) = pass.score(&task);
        // 0.3*0.3 + 0.3*1 + 0.2*0.5 + 0.2*0.5
        assert!((importance - 0.59).abs() < 1e-9);
    }

    #[test]
    fn nearer_deadline_means_higher_urgency() {
        let mut soon = leaf("1.1", 1);
        soon.deadline = Some("2026-01-11".into());
        soon.priority = 3;
        let mut later = leaf("1.2", 1);
        later.deadline = Some("2026-01-15".into());
        later.priority = 1;

        let mut root = leaf("1", 0);
        root.subtasks = vec![soon, later];

        let mut pass = ScoringPass::new(fixed_now());
        let (_, root_urgency) = pass.score(&root);
        let (_, urgency_soon) = pass.score(&root.subtasks[0]);
        let (_, urgency_later) = pass.score(&root.subtasks[1]);

        assert!(urgency_soon > urgency_later);
        // Tomorrow: 1 day of a 3-day window left, time factor 2/3.
        assert!((urgency_soon - 0.5 * (2.0 / 3.0)).abs() < 1e-9);
        // 5 days out is beyond the window entirely.
        assert!((urgency_later - 0.0).abs() < 1e-9);
        // Mean propagation.
        assert!((root_urgency - (urgency_soon + urgency_later) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn absent_deadline_gives_zero_time_pressure() {
        let mut task = leaf("1.1", 1);
        task.risk_of_delay = 10.0;
        let mut pass = ScoringPass::new(fixed_now());
        let (_, urgency) = pass.score(&task);
        assert!((urgency - 0.3).abs() < 1e-9);
    }

    #[test]
    fn malformed_deadline_falls_back_to_neutral_for_that_task_only() {
        let mut bad = leaf("1.1", 1);
        bad.deadline = Some("next tuesday-ish".into());
        let mut good = leaf("1.2", 1);
        good.priority = 10;
        let mut root = leaf("1", 0);
        root.subtasks = vec![bad, good];

        let mut pass = ScoringPass::new(fixed_now());
        pass.score(&root);
        assert_eq!(pass.score(&root.subtasks[0]), (0.5, 0.5));
        let (good_importance, _) = pass.score(&root.subtasks[1]);
        assert!((good_importance - 0.2).abs() < 1e-9);
    }

    #[test]
    fn parent_score_stays_inside_children_envelope() {
        let mut low = leaf("1.1", 1);
        low.priority = 1;
        let mut high = leaf("1.2", 1);
        high.priority = 9;
        high.critical_path = true;
        let mut root = leaf("1", 0);
        root.subtasks = vec![low, high];

        let mut pass = ScoringPass::new(fixed_now());
        let (root_imp, _) = pass.score(&root);
        let (low_imp, _) = pass.score(&root.subtasks[0]);
        let (high_imp, _) = pass.score(&root.subtasks[1]);
        assert!(low_imp <= root_imp && root_imp <= high_imp);
    }

    #[test]
    fn scores_are_memoised_within_a_pass() {
        let mut root = leaf("1", 0);
        root.subtasks = vec![leaf("1.1", 1), leaf("1.2", 1)];
        let mut pass = ScoringPass::new(fixed_now());
        let first = pass.score(&root);
        let second = pass.score(&root);
        assert_eq!(first, second);
        assert_eq!(pass.cache.len(), 3);
    }

    #[test]
    fn apply_writes_composite_scores_onto_the_tree() {
        let mut child = leaf("1.1", 1);
        child.priority = 10;
        child.critical_path = true;
        let mut root = leaf("1", 0);
        root.subtasks = vec![child];
        let mut wbs = Wbs::new(root).unwrap();

        ScoringPass::new(fixed_now()).apply(&mut wbs);

        let child = wbs.find("1.1").unwrap();
        let importance = child.importance.unwrap();
        let urgency = child.urgency.unwrap();
        assert!((importance - 0.5).abs() < 1e-9);
        assert_eq!(child.score.unwrap(), composite(importance, urgency));
        // Single child: parent scores equal the child's.
        assert_eq!(wbs.find("1").unwrap().importance, child.importance);
    }

    #[test]
    fn deadline_parser_accepts_datetime_and_date() {
        assert!(parse_deadline("2026-03-01T12:30:00").is_some());
        assert!(parse_deadline("2026-03-01 12:30:00").is_some());
        assert!(parse_deadline("2026-03-01").is_some());
        assert!(parse_deadline("03/01/2026").is_none());
    }
}
