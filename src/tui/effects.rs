use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use tracing::Dispatch;

use crate::io::source::TaskSource;
use crate::io::state::{Relationships, load_relationships, write_relationships};

use super::update::{Effect, Event};

/// Runs effects off the UI thread and queues their results as events.
///
/// Fetches and relationship loads each get a short-lived thread. Writes go
/// through one long-lived writer thread so they land in order.
pub struct EffectRunner {
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
    persist_tx: mpsc::Sender<Relationships>,
    source: Arc<dyn TaskSource>,
    state_dir: PathBuf,
    dispatch: Dispatch,
    fetch_in_flight: Arc<AtomicBool>,
}

impl EffectRunner {
    /// Start the writer thread. Returns a runner whose `poll()` should be
    /// called each tick.
    pub fn start(
        source: Arc<dyn TaskSource>,
        state_dir: PathBuf,
        dispatch: Dispatch,
    ) -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel();
        let (persist_tx, persist_rx) = mpsc::channel::<Relationships>();

        let writer_tx = tx.clone();
        let writer_dir = state_dir.clone();
        spawn_worker("sift-persist", &dispatch, move || {
            while let Ok(mut relationships) = persist_rx.recv() {
                // Only the newest state matters
                while let Ok(newer) = persist_rx.try_recv() {
                    relationships = newer;
                }
                let result = write_relationships(&writer_dir, &relationships)
                    .map_err(|e| e.to_string());
                if writer_tx.send(Event::PersistenceResult(result)).is_err() {
                    break;
                }
            }
        })?;

        Ok(EffectRunner {
            tx,
            rx,
            persist_tx,
            source,
            state_dir,
            dispatch,
            fetch_in_flight: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::FetchSnapshot => self.fetch(),
            Effect::LoadRelationships(tasks) => self.load(tasks),
            Effect::Persist(relationships) => {
                if self.persist_tx.send(relationships).is_err() {
                    tracing::error!("relationship writer has stopped");
                    let _ = self.tx.send(Event::PersistenceResult(Err(
                        "relationship writer has stopped".into(),
                    )));
                }
            }
        }
    }

    pub fn run_all(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.run(effect);
        }
    }

    /// Non-blocking poll for finished work.
    /// Returns all queued events (may be empty).
    pub fn poll(&self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// At most one fetch runs at a time; ticks during a slow fetch are dropped
    fn fetch(&self) {
        if self.fetch_in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("fetch already in flight");
            return;
        }
        let tx = self.tx.clone();
        let source = Arc::clone(&self.source);
        let in_flight = Arc::clone(&self.fetch_in_flight);
        let spawned = spawn_worker("sift-fetch", &self.dispatch, move || {
            let event = match source.fetch() {
                Ok(tasks) => Event::SnapshotReceived(tasks),
                Err(e) => Event::SourceError(e.to_string()),
            };
            in_flight.store(false, Ordering::Release);
            let _ = tx.send(event);
        });
        if let Err(e) = spawned {
            self.fetch_in_flight.store(false, Ordering::Release);
            let _ = self.tx.send(Event::SourceError(e.to_string()));
        }
    }

    fn load(&self, tasks: Vec<crate::model::Task>) {
        let tx = self.tx.clone();
        let dir = self.state_dir.clone();
        let fallback = tasks.clone();
        let spawned = spawn_worker("sift-load", &self.dispatch, move || {
            let _ = tx.send(Event::RelationshipsLoaded(load_relationships(&dir, tasks)));
        });
        if let Err(e) = spawned {
            tracing::error!(error = %e, "could not load relationships");
            let _ = self.tx.send(Event::RelationshipsLoaded(fallback));
        }
    }
}

/// Spawn a named thread that logs through `dispatch`
fn spawn_worker<F>(name: &str, dispatch: &Dispatch, f: F) -> Result<(), std::io::Error>
where
    F: FnOnce() + Send + 'static,
{
    let dispatch = dispatch.clone();
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || tracing::dispatcher::with_default(&dispatch, f))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::source::SourceError;
    use crate::io::state::{read_relationships, relationships_path};
    use crate::model::{Task, TaskStatus};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    struct FixedSource(Vec<Task>);

    impl TaskSource for FixedSource {
        fn fetch(&self) -> Result<Vec<Task>, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    impl TaskSource for BrokenSource {
        fn fetch(&self) -> Result<Vec<Task>, SourceError> {
            Err(SourceError::EmptyCommand)
        }
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("a", "A", TaskStatus::Open),
            Task::new("b", "B", TaskStatus::Open),
        ]
    }

    fn runner(source: Arc<dyn TaskSource>, dir: &TempDir) -> EffectRunner {
        EffectRunner::start(source, dir.path().to_path_buf(), Dispatch::none()).unwrap()
    }

    fn next_event(runner: &EffectRunner) -> Event {
        runner
            .rx
            .recv_timeout(Duration::from_secs(5))
            .expect("event within timeout")
    }

    #[test]
    fn fetch_posts_snapshot() {
        let dir = TempDir::new().unwrap();
        let runner = runner(Arc::new(FixedSource(tasks())), &dir);
        runner.run(Effect::FetchSnapshot);
        assert_eq!(next_event(&runner), Event::SnapshotReceived(tasks()));
    }

    #[test]
    fn fetch_failure_posts_source_error() {
        let dir = TempDir::new().unwrap();
        let runner = runner(Arc::new(BrokenSource), &dir);
        runner.run(Effect::FetchSnapshot);
        assert!(matches!(next_event(&runner), Event::SourceError(_)));
    }

    #[test]
    fn persist_writes_file_and_reports() {
        let dir = TempDir::new().unwrap();
        let runner = runner(Arc::new(FixedSource(vec![])), &dir);
        let rel: Relationships = [("b".to_string(), "a".to_string())].into_iter().collect();
        runner.run(Effect::Persist(rel.clone()));
        assert_eq!(next_event(&runner), Event::PersistenceResult(Ok(())));
        assert_eq!(read_relationships(dir.path()), Some(rel));
    }

    #[test]
    fn persist_failure_reports_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let runner =
            EffectRunner::start(Arc::new(BrokenSource), blocker, Dispatch::none()).unwrap();
        runner.run(Effect::Persist(Relationships::new()));
        assert!(matches!(
            next_event(&runner),
            Event::PersistenceResult(Err(_))
        ));
    }

    #[test]
    fn load_posts_tasks_with_saved_edges() {
        let dir = TempDir::new().unwrap();
        fs::write(relationships_path(dir.path()), r#"{"b":"a"}"#).unwrap();
        let runner = runner(Arc::new(FixedSource(vec![])), &dir);
        runner.run(Effect::LoadRelationships(tasks()));
        let Event::RelationshipsLoaded(loaded) = next_event(&runner) else {
            panic!("expected RelationshipsLoaded");
        };
        assert_eq!(loaded[1].parent_id.as_deref(), Some("a"));
    }

    #[test]
    fn poll_is_non_blocking() {
        let dir = TempDir::new().unwrap();
        let runner = runner(Arc::new(FixedSource(vec![])), &dir);
        assert!(runner.poll().is_empty());
    }
}
