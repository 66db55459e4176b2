//! # wbs - WBS Task Prioritization & Scheduling Engine
//!
//! An engine that scores a hierarchical Work Breakdown Structure (WBS),
//! derives task progress from version-control history, and levels resource
//! allocations into conflict-free sequential schedules.
//!
//! ## Key Features
//!
//! - **Recursive scoring**: leaf importance/urgency from task features
//!   (dependencies, critical path, cost impact, priority, deadline
//!   proximity, risk, stakeholder pressure), propagated to parents as the
//!   mean of their children, combined into one composite score.
//! - **Progress mining**: task progress inferred from dotted task ids
//!   (`1.2.3`) in commit messages, blended with workflow completion state,
//!   with status-aware correction.
//! - **Resource leveling**: greedy per-resource scheduler assigning
//!   non-overlapping `[start, end)` hour windows from three-point
//!   estimates.
//! - **Prioritization views**: top-N rankings and the Eisenhower
//!   importance/urgency matrix.
//! - **WBS part merging**: partial trees from separate files merged into
//!   one validated tree.
//!
//! ## Quick Start
//!
//! ```bash
//! # Full pipeline: score, mine progress, price allocations, schedule
//! wbs run --input-dir ./project --output-dir ./out
//!
//! # Score the tree and print the top ranking
//! wbs score --input-dir ./project
//!
//! # Eisenhower matrix
//! wbs matrix --input-dir ./project
//! ```
//!
//! Inputs are plain JSON files (`detailed_wbs.json`,
//! `task_resource_allocation.json`, `workflow_definition.json`,
//! `resource_costs.json`); outputs are pretty-printed JSON written
//! atomically. Only the task tree is mandatory.

pub mod cli;
pub mod cmd;
pub mod error;
pub mod fields;
pub mod gitlog;
pub mod leveling;
pub mod prioritize;
pub mod progress;
pub mod resources;
pub mod scoring;
pub mod store;
pub mod task;
pub mod wbs;
