//! End-to-end runs of the reducer with real relationship files.
//!
//! Effects are executed inline instead of on worker threads so each step is
//! deterministic.

use std::path::Path;

use pretty_assertions::assert_eq;
use sift::io::state::{load_relationships, read_relationships, write_relationships};
use sift::model::{Task, TaskStatus, TaskStore};
use sift::ops::levels::assign_levels;
use sift::tui::app::App;
use sift::tui::update::{Effect, Event, Side};
use tempfile::TempDir;

fn open(id: &str) -> Task {
    Task::new(id, format!("Task {}", id.to_uppercase()), TaskStatus::Open)
}

fn snapshot(ids: &[&str]) -> Vec<Task> {
    ids.iter().map(|id| open(id)).collect()
}

/// Run effects the way the effect runner would, feeding results back in
fn run(app: &mut App, dir: &Path, effects: Vec<Effect>, fresh: &[Task]) {
    let mut queue = effects;
    while let Some(effect) = queue.pop() {
        let event = match effect {
            Effect::FetchSnapshot => Event::SnapshotReceived(fresh.to_vec()),
            Effect::LoadRelationships(tasks) => {
                Event::RelationshipsLoaded(load_relationships(dir, tasks))
            }
            Effect::Persist(relationships) => Event::PersistenceResult(
                write_relationships(dir, &relationships).map_err(|e| e.to_string()),
            ),
        };
        queue.extend(app.update(event));
    }
}

fn boot(dir: &Path, fresh: &[Task], seed: u64) -> App {
    let mut app = App::with_seed(seed);
    let effects = app.start();
    run(&mut app, dir, effects, fresh);
    assert!(app.is_loaded());
    app
}

/// Always pick the task that comes first in `order`
fn choose_by(app: &mut App, dir: &Path, order: &[&str], fresh: &[Task]) -> usize {
    let mut choices = 0;
    while let Some(pair) = app.pair.clone() {
        let rank = |id: &str| order.iter().position(|o| *o == id).unwrap();
        let side = if rank(&pair.a.id) < rank(&pair.b.id) {
            Side::Left
        } else {
            Side::Right
        };
        let effects = app.update(Event::Choice(side));
        run(app, dir, effects, fresh);
        choices += 1;
        assert!(choices < 100, "comparison did not converge");
    }
    choices
}

fn chain(store: &TaskStore) -> Vec<String> {
    assign_levels(store)
        .iter()
        .map(|bucket| {
            assert_eq!(bucket.len(), 1);
            bucket[0].clone()
        })
        .collect()
}

#[test]
fn ranking_survives_restart() {
    let dir = TempDir::new().unwrap();
    let fresh = snapshot(&["a", "b", "c", "d", "e"]);
    let order = ["c", "a", "e", "b", "d"];

    let mut app = boot(dir.path(), &fresh, 11);
    assert!(app.pair.is_some());
    choose_by(&mut app, dir.path(), &order, &fresh);
    assert_eq!(chain(&app.tasks), order);

    let saved = read_relationships(dir.path()).unwrap();
    assert_eq!(saved.len(), 4);
    assert_eq!(saved.get("a").map(String::as_str), Some("c"));

    // A new session starts fully ranked with nothing to compare
    let app = boot(dir.path(), &fresh, 12);
    assert_eq!(app.pair, None);
    assert_eq!(chain(&app.tasks), order);
}

#[test]
fn completed_task_leaves_chain_intact() {
    let dir = TempDir::new().unwrap();
    let fresh = snapshot(&["a", "b", "c", "d"]);
    let order = ["d", "c", "b", "a"];
    let mut app = boot(dir.path(), &fresh, 3);
    choose_by(&mut app, dir.path(), &order, &fresh);

    // c gets done upstream; b moves up under d
    let mut refreshed = fresh.clone();
    refreshed[2].status = TaskStatus::Completed;
    let effects = app.update(Event::RefreshTick);
    run(&mut app, dir.path(), effects, &refreshed);

    assert_eq!(chain(&app.tasks), ["d", "b", "a"]);
    assert_eq!(app.tasks.get("b").unwrap().parent_id.as_deref(), Some("d"));
    assert_eq!(app.pair, None);
}

#[test]
fn stale_saved_edges_are_repaired_on_startup() {
    let dir = TempDir::new().unwrap();
    // Saved last session: c under b under a
    let saved = [("b", "a"), ("c", "b")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    write_relationships(dir.path(), &saved).unwrap();

    // a was completed while sift was closed
    let mut fresh = snapshot(&["a", "b", "c"]);
    fresh[0].status = TaskStatus::Completed;
    let app = boot(dir.path(), &fresh, 5);

    assert_eq!(app.tasks.get("b").unwrap().parent_id, None);
    assert_eq!(app.tasks.get("c").unwrap().parent_id.as_deref(), Some("b"));
    assert_eq!(chain(&app.tasks), ["b", "c"]);
}

#[test]
fn new_task_is_compared_against_the_top() {
    let dir = TempDir::new().unwrap();
    let fresh = snapshot(&["a", "b"]);
    let mut app = boot(dir.path(), &fresh, 8);
    choose_by(&mut app, dir.path(), &["a", "b"], &fresh);
    assert_eq!(app.pair, None);

    let refreshed = snapshot(&["a", "b", "n"]);
    let effects = app.update(Event::RefreshTick);
    run(&mut app, dir.path(), effects, &refreshed);

    let pair = app.pair.clone().unwrap();
    let mut ids = [pair.a.id.as_str(), pair.b.id.as_str()];
    ids.sort();
    assert_eq!(ids, ["a", "n"]);
}

#[test]
fn undo_then_reset_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let fresh = snapshot(&["a", "b", "c"]);
    let mut app = boot(dir.path(), &fresh, 21);

    let effects = app.update(Event::Choice(Side::Left));
    run(&mut app, dir.path(), effects, &fresh);
    assert_eq!(read_relationships(dir.path()).unwrap().len(), 1);

    let effects = app.update(Event::UndoRequested);
    run(&mut app, dir.path(), effects, &fresh);
    assert!(read_relationships(dir.path()).unwrap().is_empty());

    choose_by(&mut app, dir.path(), &["b", "c", "a"], &fresh);
    assert_eq!(read_relationships(dir.path()).unwrap().len(), 2);

    let effects = app.update(Event::ResetRequested);
    run(&mut app, dir.path(), effects, &fresh);
    assert!(read_relationships(dir.path()).unwrap().is_empty());
    assert!(app.pair.is_some());
    assert!(app.history.is_empty());
}
