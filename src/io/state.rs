use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::model::{Task, TaskStore};

/// Persisted hierarchy: child task ID -> parent task ID
pub type Relationships = BTreeMap<String, String>;

const RELATIONSHIPS_FILE: &str = "relationships.json";

/// Error type for writing relationships.json
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not create state directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize relationships: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub fn relationships_path(state_dir: &Path) -> PathBuf {
    state_dir.join(RELATIONSHIPS_FILE)
}

/// Read relationships.json. A missing, unreadable or malformed file reads as
/// None: there is no saved state.
pub fn read_relationships(state_dir: &Path) -> Option<Relationships> {
    let path = relationships_path(state_dir);
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(rel) => Some(rel),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed relationships file");
            None
        }
    }
}

/// Write relationships.json atomically (temp file + rename)
pub fn write_relationships(state_dir: &Path, relationships: &Relationships) -> Result<(), StateError> {
    fs::create_dir_all(state_dir).map_err(|e| StateError::CreateDir {
        path: state_dir.to_path_buf(),
        source: e,
    })?;
    let path = relationships_path(state_dir);
    let content = serde_json::to_string(relationships)?;
    let write_err = |e: std::io::Error| StateError::Write {
        path: path.clone(),
        source: e,
    };
    let mut tmp = tempfile::NamedTempFile::new_in(state_dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.persist(&path).map_err(|e| write_err(e.error))?;
    tracing::debug!(path = %path.display(), edges = relationships.len(), "wrote relationships");
    Ok(())
}

/// Apply saved relationships to a freshly fetched snapshot.
/// Without saved state the tasks come back unchanged.
pub fn load_relationships(state_dir: &Path, tasks: Vec<Task>) -> Vec<Task> {
    let Some(relationships) = read_relationships(state_dir) else {
        tracing::info!("no saved relationships");
        return tasks;
    };
    let mut store = TaskStore::from_tasks(tasks);
    let skipped = store.apply_relationships(&relationships);
    for id in &skipped {
        tracing::warn!(task = %id, "skipping saved parent that would form a cycle");
    }
    tracing::info!(saved = relationships.len(), skipped = skipped.len(), "loaded relationships");
    store.into_tasks()
}
