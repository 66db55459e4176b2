//! File-backed input loading and output writing.
//!
//! Inputs are plain JSON documents. The task tree is the only input whose
//! absence or malformation is fatal; every other file degrades to an empty
//! signal with a warning when missing. Outputs are pretty-printed and
//! written atomically (temp file + rename).

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::task::{ResourceAllocation, ResourceCost, Task, WorkflowStep};
use crate::wbs::Wbs;

// Input file names, relative to the input directory.
pub const WBS_FILE: &str = "detailed_wbs.json";
pub const ALLOCATIONS_FILE: &str = "task_resource_allocation.json";
pub const WORKFLOW_FILE: &str = "workflow_definition.json";
pub const RESOURCE_COSTS_FILE: &str = "resource_costs.json";

// Output file names, relative to the output directory.
pub const ENRICHED_WBS_FILE: &str = "enriched_wbs.json";
pub const COMMIT_PROGRESS_FILE: &str = "commit_progress.json";
pub const SCHEDULE_FILE: &str = "leveled_schedule.json";
pub const COST_SUMMARY_FILE: &str = "resource_cost_summary.json";
pub const MERGED_WBS_FILE: &str = "merged_wbs.json";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate the task tree. Fatal when missing or malformed: no
/// correct output can be derived from a broken tree.
pub fn load_wbs(path: &Path) -> Result<Wbs> {
    let root: Task = read_json(path)?;
    Wbs::new(root)
}

fn load_optional<T: DeserializeOwned + Default>(path: &Path, what: &str) -> Result<T> {
    if !path.exists() {
        warn!(path = %path.display(), "no {what} file, treating as empty");
        return Ok(T::default());
    }
    read_json(path)
}

/// Resource allocation records; missing file means no allocations.
pub fn load_allocations(path: &Path) -> Result<Vec<ResourceAllocation>> {
    load_optional(path, "resource allocation")
}

/// Workflow step definitions; missing file means no workflow signal.
pub fn load_workflow(path: &Path) -> Result<Vec<WorkflowStep>> {
    load_optional(path, "workflow definition")
}

/// Per-resource hourly costs; missing file means everything prices at zero.
pub fn load_resource_costs(path: &Path) -> Result<HashMap<String, ResourceCost>> {
    load_optional(path, "resource cost")
}

/// Load every `.json` file in a directory as a WBS part, sorted by file
/// name for a deterministic merge order.
pub fn load_wbs_parts(dir: &Path) -> Result<Vec<Task>> {
    let entries = fs::read_dir(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        parts.push(read_json(&path)?);
    }
    Ok(parts)
}

/// Write a value as pretty-printed JSON using atomic write (temp + rename).
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let data = serde_json::to_string_pretty(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut f = File::create(&tmp).map_err(io_err)?;
    f.write_all(data.as_bytes()).map_err(io_err)?;
    f.flush().map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}
