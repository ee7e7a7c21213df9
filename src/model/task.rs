use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Task status as reported by the task source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Completed,
    Canceled,
}

impl TaskStatus {
    /// Completed and canceled tasks drop out of prioritization entirely
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Canceled)
    }
}

/// A task from the external source plus its locally owned parent edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable ID assigned by the task source
    #[serde(alias = "ID")]
    pub id: String,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Status")]
    pub status: TaskStatus,
    /// The task this one was ranked below (None = root)
    #[serde(skip)]
    pub parent_id: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: TaskStatus) -> Self {
        Task {
            id: id.into(),
            name: name.into(),
            status,
            parent_id: None,
        }
    }

    /// Builder-style parent assignment
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// The in-memory task collection, keyed by task ID.
///
/// Insertion order follows the order of the last snapshot, which is also the
/// display order. Everything outside the store refers to tasks by ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: IndexMap<String, Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a list of tasks. A later duplicate ID replaces an
    /// earlier one in place.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut store = TaskStore::new();
        for task in tasks {
            store.insert(task);
        }
        store
    }

    pub fn insert(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Consume the store, yielding tasks in display order
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks.into_values().collect()
    }

    pub fn to_vec(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    /// Set a task's parent, returning the previous parent.
    /// Returns None (and changes nothing) if the task doesn't exist.
    pub fn set_parent(&mut self, id: &str, parent_id: Option<String>) -> Option<Option<String>> {
        let task = self.tasks.get_mut(id)?;
        Some(std::mem::replace(&mut task.parent_id, parent_id))
    }

    /// Make every task a root
    pub fn clear_parents(&mut self) {
        for task in self.tasks.values_mut() {
            task.parent_id = None;
        }
    }

    /// True if `ancestor` is reachable from `id` by following parent edges.
    /// Stops on broken links and on revisited IDs.
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut seen = std::collections::HashSet::new();
        let mut current = self.get(id).and_then(|t| t.parent_id.as_deref());
        while let Some(pid) = current {
            if pid == ancestor {
                return true;
            }
            if !seen.insert(pid) {
                return false;
            }
            current = self.get(pid).and_then(|t| t.parent_id.as_deref());
        }
        false
    }

    /// The persisted form of the hierarchy: child ID -> parent ID.
    /// Roots are absent from the map.
    pub fn relationships(&self) -> BTreeMap<String, String> {
        self.tasks
            .values()
            .filter_map(|t| t.parent_id.clone().map(|p| (t.id.clone(), p)))
            .collect()
    }

    /// Apply stored relationships to tasks present in the store.
    ///
    /// Edges to self and edges that would close a cycle are skipped; their
    /// child IDs are returned. Edges to parents missing from the store are
    /// kept as broken links.
    pub fn apply_relationships(&mut self, relationships: &BTreeMap<String, String>) -> Vec<String> {
        let mut skipped = Vec::new();
        let ids: Vec<String> = self.tasks.keys().cloned().collect();
        for id in ids {
            let Some(parent) = relationships.get(&id) else {
                continue;
            };
            if *parent == id || self.is_ancestor(&id, parent) {
                skipped.push(id);
                continue;
            }
            self.set_parent(&id, Some(parent.clone()));
        }
        skipped
    }
}
