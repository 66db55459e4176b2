//! WBS tree model: validation, lookup, flattening and part merging.
//!
//! The recursive `subtasks` shape is kept as the canonical serialization
//! format, but all `find`/`remove` operations go through an id → child-index
//! path map built once per load, so repeated lookups never re-walk the tree.
//! The index is rebuilt after any structural mutation.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::task::Task;

/// A task plus the parent pointer lost by flattening.
///
/// `task.subtasks` is emptied in the flat form; hierarchy is reconstructible
/// from `parent_id`.
#[derive(Debug, Clone)]
pub struct FlatTask {
    pub parent_id: Option<String>,
    pub task: Task,
}

/// A validated task tree with an id lookup index.
#[derive(Debug, Clone)]
pub struct Wbs {
    root: Task,
    index: HashMap<String, Vec<usize>>,
}

impl Wbs {
    /// Validate a loaded tree and build the lookup index.
    ///
    /// Rejects empty ids, empty titles, duplicate ids, a non-zero root level
    /// and any child whose `level` is not `parent.level + 1`. The error names
    /// the offending node so a user can fix the input document.
    pub fn new(root: Task) -> Result<Self> {
        if root.level != 0 {
            return Err(Error::invalid_tree(
                &root.id,
                format!("root level must be 0, found {}", root.level),
            ));
        }
        validate_node(&root, None)?;

        let mut seen = HashSet::new();
        let mut index = HashMap::new();
        build_index(&root, &mut Vec::new(), &mut index, &mut seen)?;

        Ok(Wbs { root, index })
    }

    pub fn root(&self) -> &Task {
        &self.root
    }

    /// Consume the tree, returning the enriched root for serialization.
    pub fn into_root(self) -> Task {
        self.root
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Look a task up by id. Absent ids are not an error.
    pub fn find(&self, id: &str) -> Option<&Task> {
        self.index.get(id).map(|path| node_at(&self.root, path))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        let path = self.index.get(id)?.clone();
        Some(node_at_mut(&mut self.root, &path))
    }

    /// Remove a node and its entire subtree from its parent.
    ///
    /// Children are not re-parented. The root cannot be removed. Returns
    /// whether a removal occurred.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(path) = self.index.get(id).cloned() else {
            return false;
        };
        let Some((&child_idx, parent_path)) = path.split_last() else {
            return false; // root
        };
        node_at_mut(&mut self.root, parent_path)
            .subtasks
            .remove(child_idx);
        self.rebuild_index();
        true
    }

    /// Pre-order flat view of the whole tree.
    pub fn flatten(&self) -> Vec<FlatTask> {
        let mut out = Vec::with_capacity(self.index.len());
        flatten_into(&self.root, None, &mut out);
        out
    }

    /// Visit every task mutably in pre-order. Must not change the structure;
    /// intended for writing derived fields back onto nodes.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Task)) {
        for_each_mut_inner(&mut self.root, &mut f);
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        let mut seen = HashSet::new();
        // Ids were unique at construction and removal cannot introduce
        // duplicates, so this cannot fail.
        let _ = build_index(&self.root, &mut Vec::new(), &mut self.index, &mut seen);
    }
}

fn validate_node(task: &Task, parent: Option<&Task>) -> Result<()> {
    if task.id.trim().is_empty() {
        let context = parent.map(|p| p.id.as_str()).unwrap_or("<root>");
        return Err(Error::invalid_tree(
            context,
            "subtask is missing an id".to_string(),
        ));
    }
    if task.title.trim().is_empty() {
        return Err(Error::invalid_tree(&task.id, "missing title"));
    }
    if let Some(parent) = parent {
        if task.level != parent.level + 1 {
            return Err(Error::invalid_tree(
                &task.id,
                format!(
                    "level {} does not follow parent level {}",
                    task.level, parent.level
                ),
            ));
        }
    }
    for sub in &task.subtasks {
        validate_node(sub, Some(task))?;
    }
    Ok(())
}

fn build_index(
    task: &Task,
    path: &mut Vec<usize>,
    index: &mut HashMap<String, Vec<usize>>,
    seen: &mut HashSet<String>,
) -> Result<()> {
    if !seen.insert(task.id.clone()) {
        return Err(Error::invalid_tree(&task.id, "duplicate task id"));
    }
    index.insert(task.id.clone(), path.clone());
    for (i, sub) in task.subtasks.iter().enumerate() {
        path.push(i);
        build_index(sub, path, index, seen)?;
        path.pop();
    }
    Ok(())
}

fn node_at<'a>(mut node: &'a Task, path: &[usize]) -> &'a Task {
    for &i in path {
        node = &node.subtasks[i];
    }
    node
}

fn node_at_mut<'a>(mut node: &'a mut Task, path: &[usize]) -> &'a mut Task {
    for &i in path {
        node = &mut node.subtasks[i];
    }
    node
}

fn flatten_into(task: &Task, parent_id: Option<&str>, out: &mut Vec<FlatTask>) {
    let mut flat = task.clone();
    flat.subtasks = Vec::new();
    out.push(FlatTask {
        parent_id: parent_id.map(str::to_string),
        task: flat,
    });
    for sub in &task.subtasks {
        flatten_into(sub, Some(&task.id), out);
    }
}

fn for_each_mut_inner(task: &mut Task, f: &mut impl FnMut(&mut Task)) {
    f(task);
    for sub in &mut task.subtasks {
        for_each_mut_inner(sub, f);
    }
}

/// Merge two subtask sequences, right-biased.
///
/// For ids present in both, the additional record's `cost`,
/// `quality_metrics`, `risk_factors` and `resource_assignments` overwrite
/// the base record's (when present), and their subtasks are merged
/// recursively. Ids only in `additional` are appended verbatim.
pub fn merge_subtasks(base: &[Task], additional: &[Task]) -> Vec<Task> {
    let mut merged: Vec<Task> = base.to_vec();
    for add in additional {
        if let Some(existing) = merged.iter_mut().find(|t| t.id == add.id) {
            if add.cost.is_some() {
                existing.cost = add.cost;
            }
            if add.quality_metrics.is_some() {
                existing.quality_metrics = add.quality_metrics.clone();
            }
            if add.risk_factors.is_some() {
                existing.risk_factors = add.risk_factors.clone();
            }
            if add.resource_assignments.is_some() {
                existing.resource_assignments = add.resource_assignments.clone();
            }
            existing.subtasks = merge_subtasks(&existing.subtasks, &add.subtasks);
        } else {
            merged.push(add.clone());
        }
    }
    merged
}
