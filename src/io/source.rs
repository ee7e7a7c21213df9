use std::process::Command;

use crate::model::Task;

/// JXA script that prints the Things 3 "Today" list as JSON
const THINGS_TODAY_SCRIPT: &str = r#"
const Things = Application('Things3');
const todos = Things.lists.byName('Today').toDos();
JSON.stringify(todos.map(todo => ({
    id: todo.id(),
    name: todo.name(),
    status: todo.status(),
})));
"#;

/// Error type for fetching the task snapshot
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("task source command is empty")]
    EmptyCommand,
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("malformed task list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that can produce a flat, parent-less snapshot of tasks
pub trait TaskSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<Task>, SourceError>;
}

/// Runs an external command and parses its stdout as a JSON task list
#[derive(Debug, Clone)]
pub struct CommandSource {
    argv: Vec<String>,
}

impl CommandSource {
    pub fn new(argv: Vec<String>) -> Self {
        CommandSource { argv }
    }

    /// The Things 3 "Today" list via osascript
    pub fn things_today() -> Self {
        Self::new(vec![
            "osascript".into(),
            "-l".into(),
            "JavaScript".into(),
            "-e".into(),
            THINGS_TODAY_SCRIPT.into(),
        ])
    }

    /// Configured argv, or Things 3 when none is configured
    pub fn from_config(command: &[String]) -> Self {
        if command.is_empty() {
            Self::things_today()
        } else {
            Self::new(command.to_vec())
        }
    }
}

impl TaskSource for CommandSource {
    fn fetch(&self) -> Result<Vec<Task>, SourceError> {
        let (program, args) = self.argv.split_first().ok_or(SourceError::EmptyCommand)?;
        tracing::debug!(program = %program, "fetching tasks");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| SourceError::Spawn {
                program: program.clone(),
                source: e,
            })?;
        if !output.status.success() {
            return Err(SourceError::Failed {
                program: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let tasks = parse_tasks(&output.stdout)?;
        tracing::info!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }
}

/// Parse a JSON task array. Parents are never taken from the source.
pub fn parse_tasks(bytes: &[u8]) -> Result<Vec<Task>, SourceError> {
    let mut tasks: Vec<Task> = serde_json::from_slice(bytes)?;
    for task in &mut tasks {
        task.parent_id = None;
    }
    Ok(tasks)
}
