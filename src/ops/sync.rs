//! Merging a fresh task snapshot into the priority forest.
//!
//! The task source owns names and statuses; parent edges are owned locally.
//! A sync keeps every edge it can and re-parents children whose parent was
//! deleted upstream or reached a terminal status.

use std::collections::{HashMap, HashSet};

use crate::model::{Task, TaskStore};

/// Nodes that can no longer act as a parent, mapped to their own parent
type Unavailable = HashMap<String, Option<String>>;

/// Walk up from `parent_id` to the first ancestor that is still available.
///
/// Each unavailable node records its own former parent, so the walk hops over
/// any number of contiguous unavailable ancestors. Returns None when the walk
/// runs off the top of the chain.
pub fn find_first_available_ancestor(
    parent_id: Option<&str>,
    unavailable: &HashMap<String, Option<String>>,
) -> Option<String> {
    let mut ancestor = parent_id;
    let mut seen = HashSet::new();
    while let Some(id) = ancestor {
        match unavailable.get(id) {
            None => return Some(id.to_string()),
            Some(next) => {
                if !seen.insert(id) {
                    return None;
                }
                ancestor = next.as_deref();
            }
        }
    }
    None
}

/// Merge `fresh` into `existing`.
///
/// The result holds exactly the tasks of `fresh`, in its order. Known tasks
/// keep their parent and take the fresh name and status; new tasks come in as
/// roots. Children of deleted, completed or canceled tasks move up to their
/// nearest surviving ancestor.
pub fn sync_tasks(existing: &TaskStore, fresh: &[Task]) -> TaskStore {
    let mut merged = TaskStore::new();
    for task in fresh {
        let parent_id = existing.get(&task.id).and_then(|t| t.parent_id.clone());
        merged.insert(Task {
            id: task.id.clone(),
            name: task.name.clone(),
            status: task.status,
            parent_id,
        });
    }

    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    for task in merged.iter() {
        if let Some(parent_id) = &task.parent_id {
            children
                .entry(parent_id.clone())
                .or_default()
                .push(task.id.clone());
        }
    }

    let mut unavailable: Unavailable = HashMap::new();
    for task in existing.iter() {
        if !merged.contains(&task.id) {
            unavailable.insert(task.id.clone(), task.parent_id.clone());
        }
    }
    for task in merged.iter() {
        if task.status.is_terminal() {
            unavailable.insert(task.id.clone(), task.parent_id.clone());
        }
    }

    let mut reassignments = Vec::new();
    for (parent_id, grandparent_id) in &unavailable {
        let Some(child_ids) = children.get(parent_id) else {
            continue;
        };
        let new_parent = find_first_available_ancestor(grandparent_id.as_deref(), &unavailable);
        for child_id in child_ids {
            reassignments.push((child_id.clone(), new_parent.clone()));
        }
    }

    for (child_id, new_parent) in reassignments {
        tracing::debug!(
            child = %child_id,
            parent = new_parent.as_deref().unwrap_or("<root>"),
            "re-parenting orphan"
        );
        merged.set_parent(&child_id, new_parent);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use crate::ops::levels::assign_levels;
    use pretty_assertions::assert_eq;

    fn open(id: &str) -> Task {
        Task::new(id, format!("Task {}", id.to_uppercase()), TaskStatus::Open)
    }

    fn with_status(id: &str, status: TaskStatus) -> Task {
        Task::new(id, format!("Task {}", id.to_uppercase()), status)
    }

    /// A snapshot as the source delivers it: no parents
    fn snapshot(ids: &[&str]) -> Vec<Task> {
        ids.iter().map(|id| open(id)).collect()
    }

    fn parent<'a>(store: &'a TaskStore, id: &str) -> Option<&'a str> {
        store.get(id).and_then(|t| t.parent_id.as_deref())
    }

    fn chain_abcd() -> TaskStore {
        TaskStore::from_tasks(vec![
            open("a"),
            open("b").with_parent("a"),
            open("c").with_parent("b"),
            open("d").with_parent("c"),
        ])
    }

    fn unavailable(pairs: &[(&str, Option<&str>)]) -> HashMap<String, Option<String>> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn ancestor_of_none_is_none() {
        assert_eq!(find_first_available_ancestor(None, &HashMap::new()), None);
    }

    #[test]
    fn available_parent_is_returned_as_is() {
        let u = unavailable(&[("x", None)]);
        assert_eq!(find_first_available_ancestor(Some("a"), &u), Some("a".into()));
    }

    #[test]
    fn walks_past_contiguous_unavailable_ancestors() {
        let u = unavailable(&[("c", Some("b")), ("b", Some("a"))]);
        assert_eq!(find_first_available_ancestor(Some("c"), &u), Some("a".into()));
    }

    #[test]
    fn exhausted_chain_yields_root() {
        let u = unavailable(&[("b", Some("a")), ("a", None)]);
        assert_eq!(find_first_available_ancestor(Some("b"), &u), None);
    }

    #[test]
    fn cyclic_unavailable_chain_yields_root() {
        let u = unavailable(&[("a", Some("b")), ("b", Some("a"))]);
        assert_eq!(find_first_available_ancestor(Some("a"), &u), None);
    }

    #[test]
    fn new_tasks_arrive_as_roots() {
        let merged = sync_tasks(&TaskStore::new(), &snapshot(&["a", "b"]));
        assert_eq!(merged.len(), 2);
        assert!(merged.relationships().is_empty());
    }

    #[test]
    fn existing_edges_are_preserved_and_fields_updated() {
        let existing = TaskStore::from_tasks(vec![open("a"), open("b").with_parent("a")]);
        let mut fresh = snapshot(&["a", "b", "c"]);
        fresh[1].name = "Renamed".into();
        let merged = sync_tasks(&existing, &fresh);
        assert_eq!(parent(&merged, "b"), Some("a"));
        assert_eq!(merged.get("b").unwrap().name, "Renamed");
        assert_eq!(parent(&merged, "c"), None);
    }

    #[test]
    fn result_matches_fresh_identity_set_and_order() {
        let existing = TaskStore::from_tasks(vec![open("a"), open("b"), open("c")]);
        let merged = sync_tasks(&existing, &snapshot(&["c", "a", "z"]));
        let ids: Vec<&str> = merged.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "z"]);
    }

    #[test]
    fn deleted_middle_node_promotes_child_to_grandparent() {
        let merged = sync_tasks(&chain_abcd(), &snapshot(&["a", "c", "d"]));
        assert_eq!(parent(&merged, "c"), Some("a"));
        assert_eq!(parent(&merged, "d"), Some("c"));
    }

    #[test]
    fn deleted_root_promotes_children_to_roots() {
        let existing = TaskStore::from_tasks(vec![
            open("a"),
            open("b").with_parent("a"),
            open("c").with_parent("a"),
        ]);
        let merged = sync_tasks(&existing, &snapshot(&["b", "c"]));
        assert_eq!(parent(&merged, "b"), None);
        assert_eq!(parent(&merged, "c"), None);
    }

    #[test]
    fn multi_level_deletion_skips_all_deleted_ancestors() {
        let merged = sync_tasks(&chain_abcd(), &snapshot(&["a", "d"]));
        assert_eq!(parent(&merged, "d"), Some("a"));
    }

    #[test]
    fn deleting_a_whole_root_subtree_leaves_other_branches() {
        let existing = TaskStore::from_tasks(vec![
            open("a"),
            open("b").with_parent("a"),
            open("c").with_parent("b"),
            open("x"),
            open("y").with_parent("x"),
        ]);
        let merged = sync_tasks(&existing, &snapshot(&["x", "y"]));
        assert_eq!(merged.len(), 2);
        assert_eq!(parent(&merged, "y"), Some("x"));
    }

    #[test]
    fn completed_parent_releases_children() {
        let fresh = vec![
            open("a"),
            with_status("b", TaskStatus::Completed),
            open("c"),
            open("d"),
        ];
        let merged = sync_tasks(&chain_abcd(), &fresh);
        assert_eq!(parent(&merged, "c"), Some("a"));
        assert_eq!(parent(&merged, "d"), Some("c"));
        // The completed task keeps its own edge; it's out of leveling anyway
        assert_eq!(parent(&merged, "b"), Some("a"));
    }

    #[test]
    fn deletion_and_completion_in_one_pass() {
        let fresh = vec![
            with_status("a", TaskStatus::Canceled),
            open("c"),
            open("d"),
        ];
        let merged = sync_tasks(&chain_abcd(), &fresh);
        assert_eq!(parent(&merged, "c"), None);
        assert_eq!(parent(&merged, "d"), Some("c"));

        let fresh = vec![open("a"), open("b"), with_status("c", TaskStatus::Completed), open("d")];
        let existing = TaskStore::from_tasks(vec![
            open("a"),
            open("b").with_parent("a"),
            open("c").with_parent("b"),
            open("d").with_parent("c"),
            open("e").with_parent("a"),
        ]);
        let merged = sync_tasks(&existing, &fresh);
        assert_eq!(parent(&merged, "d"), Some("b"));
    }

    #[test]
    fn sync_is_idempotent() {
        let existing = TaskStore::from_tasks(vec![
            open("a"),
            open("b").with_parent("a"),
            open("c").with_parent("b"),
            open("d").with_parent("c"),
            open("e").with_parent("d"),
        ]);
        let fresh = vec![
            open("a"),
            with_status("c", TaskStatus::Completed),
            open("d"),
            open("e"),
            open("f"),
        ];
        let once = sync_tasks(&existing, &fresh);
        let twice = sync_tasks(&once, &fresh);
        assert_eq!(once.relationships(), twice.relationships());
        assert_eq!(once, twice);
    }

    #[test]
    fn orphan_promotion_keeps_levels_consistent() {
        let merged = sync_tasks(&chain_abcd(), &snapshot(&["a", "c", "d"]));
        let levels = assign_levels(&merged);
        assert_eq!(levels.bucket(0), ["a".to_string()]);
        assert_eq!(levels.bucket(1), ["c".to_string()]);
        assert_eq!(levels.bucket(2), ["d".to_string()]);
    }
}
