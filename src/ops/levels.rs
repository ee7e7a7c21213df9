use std::collections::HashSet;

use crate::model::{Task, TaskStore};

/// Task IDs grouped by depth in the priority forest. Index 0 holds the roots.
///
/// Buckets are contiguous: an empty bucket is kept if any deeper bucket has
/// members, so a bucket's index is always the depth of its tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Levels {
    buckets: Vec<Vec<String>>,
}

/// Depth of a task below its ultimate ancestor, or None for completed and
/// canceled tasks.
///
/// A parent ID that isn't in the store ends the walk, so the last task reached
/// counts as a root. The walk also stops if it comes back to
/// a task it already visited, so corrupt cyclic data can't hang it.
pub fn level(task: &Task, store: &TaskStore) -> Option<usize> {
    if task.status.is_terminal() {
        return None;
    }
    let mut depth = 0;
    let mut seen = HashSet::from([task.id.as_str()]);
    let mut current = task;
    while let Some(parent_id) = current.parent_id.as_deref() {
        let Some(parent) = store.get(parent_id) else {
            break;
        };
        if !seen.insert(parent.id.as_str()) {
            break;
        }
        depth += 1;
        current = parent;
    }
    Some(depth)
}

/// Group every live task by depth
pub fn assign_levels(store: &TaskStore) -> Levels {
    let mut buckets: Vec<Vec<String>> = Vec::new();
    for task in store.iter() {
        let Some(depth) = level(task, store) else {
            continue;
        };
        if depth >= buckets.len() {
            buckets.resize_with(depth + 1, Vec::new);
        }
        buckets[depth].push(task.id.clone());
    }
    Levels { buckets }
}

impl Levels {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, depth: usize) -> &[String] {
        self.buckets.get(depth).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.buckets.iter().map(Vec::as_slice)
    }

    /// The depth closest to the roots whose bucket holds more than one task.
    /// Ambiguity there blocks the most ordering below it, so it's resolved
    /// first.
    pub fn highest_ambiguous(&self) -> Option<usize> {
        self.buckets.iter().position(|b| b.len() > 1)
    }

    /// True if the bucket at `depth` and every bucket above it hold exactly
    /// one task. Says nothing about ambiguity below `depth`.
    pub fn is_resolved_through(&self, depth: usize) -> bool {
        depth < self.buckets.len() && self.buckets[..=depth].iter().all(|b| b.len() == 1)
    }

    /// Whether `id` is in the bucket at `depth`
    pub fn contains(&self, depth: usize, id: &str) -> bool {
        self.bucket(depth).iter().any(|b| b == id)
    }
}

/// True if the task is the only one at its depth and every shallower depth
/// also has a single task, i.e. it sits on the resolved chain from the root.
pub fn is_fully_prioritized(task: &Task, store: &TaskStore) -> bool {
    match level(task, store) {
        Some(depth) => assign_levels(store).is_resolved_through(depth),
        None => false,
    }
}
