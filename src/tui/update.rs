//! The single reducer that every event goes through.
//!
//! `App::update` mutates state and returns effects to run; it never does I/O
//! itself. Fetch and persistence results come back later as ordinary events.

use crate::io::state::Relationships;
use crate::model::{Task, TaskStore};
use crate::ops::compare::{pair_needs_update, select_pair, select_pair_with_preference};
use crate::ops::sync::sync_tasks;

use super::app::{App, StatusMessage};
use super::undo::Decision;

/// Which side of the comparison the user picked as more important
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Everything that can happen to the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A fresh, parent-less snapshot from the task source
    SnapshotReceived(Vec<Task>),
    /// Saved relationships applied to the startup snapshot
    RelationshipsLoaded(Vec<Task>),
    Choice(Side),
    UndoRequested,
    ResetRequested,
    RefreshTick,
    PersistenceResult(Result<(), String>),
    SourceError(String),
}

/// Work for the effect runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchSnapshot,
    LoadRelationships(Vec<Task>),
    Persist(Relationships),
}

impl App {
    /// Effects to run when the app starts
    pub fn start(&self) -> Vec<Effect> {
        vec![Effect::FetchSnapshot]
    }

    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::SnapshotReceived(tasks) => self.on_snapshot(tasks),
            Event::RelationshipsLoaded(tasks) => self.on_relationships_loaded(tasks),
            Event::Choice(side) => self.on_choice(side),
            Event::UndoRequested => self.on_undo(),
            Event::ResetRequested => self.on_reset(),
            Event::RefreshTick => vec![Effect::FetchSnapshot],
            Event::PersistenceResult(Ok(())) => {
                tracing::debug!("relationships saved");
                Vec::new()
            }
            Event::PersistenceResult(Err(e)) => {
                tracing::error!(error = %e, "could not save relationships");
                self.status = Some(StatusMessage::error(format!("save failed: {}", e)));
                Vec::new()
            }
            Event::SourceError(e) => {
                tracing::error!(error = %e, "could not fetch tasks");
                self.status = Some(StatusMessage::error(format!("fetch failed: {}", e)));
                Vec::new()
            }
        }
    }

    fn on_snapshot(&mut self, fresh: Vec<Task>) -> Vec<Effect> {
        tracing::debug!(count = fresh.len(), "snapshot received");
        self.tasks = sync_tasks(&self.tasks, &fresh);
        // A message lasts until the next snapshot or user action
        self.status = None;
        match self.load_state {
            LoadState::Pending => {
                self.load_state = LoadState::Loading;
                vec![Effect::LoadRelationships(self.tasks.to_vec())]
            }
            LoadState::Loading => Vec::new(),
            LoadState::Loaded => {
                if pair_needs_update(self.pair.as_ref(), &self.tasks) {
                    self.reselect_pair();
                }
                Vec::new()
            }
        }
    }

    /// Merge the loaded edges into the newest snapshot. The reconciler also
    /// repairs saved edges that point at tasks completed since last run.
    fn on_relationships_loaded(&mut self, tasks: Vec<Task>) -> Vec<Effect> {
        let loaded = TaskStore::from_tasks(tasks);
        let current = self.tasks.to_vec();
        self.tasks = sync_tasks(&loaded, &current);
        self.load_state = LoadState::Loaded;
        self.pair = select_pair(&self.tasks, &mut self.rng);
        tracing::info!(
            tasks = self.tasks.len(),
            edges = self.tasks.relationships().len(),
            "startup complete"
        );
        Vec::new()
    }

    fn on_choice(&mut self, side: Side) -> Vec<Effect> {
        if !self.is_loaded() {
            return Vec::new();
        }
        let Some(pair) = self.pair.clone() else {
            return Vec::new();
        };
        if pair_needs_update(Some(&pair), &self.tasks) {
            tracing::debug!("dropping choice against a stale pair");
            self.reselect_pair();
            return Vec::new();
        }
        let (winner, loser) = match side {
            Side::Left => (&pair.a.id, &pair.b.id),
            Side::Right => (&pair.b.id, &pair.a.id),
        };
        let Some(previous) = self.tasks.set_parent(loser, Some(winner.clone())) else {
            return Vec::new();
        };
        tracing::info!(winner = %winner, loser = %loser, "ranked");
        self.status = None;
        self.history.push(Decision {
            child_id: loser.clone(),
            previous_parent_id: previous,
            task_a_id: pair.a.id.clone(),
            task_b_id: pair.b.id.clone(),
        });
        self.pair = select_pair(&self.tasks, &mut self.rng);
        vec![Effect::Persist(self.tasks.relationships())]
    }

    fn on_undo(&mut self) -> Vec<Effect> {
        let Some(decision) = self.history.undo(&mut self.tasks) else {
            match self.history.peek_last() {
                Some(last) => {
                    tracing::debug!(task = %last.child_id, "last choice can no longer be undone");
                }
                None => tracing::debug!("nothing to undo"),
            }
            return Vec::new();
        };
        tracing::info!(task = %decision.child_id, "undid ranking");
        self.status = None;
        self.pair = select_pair_with_preference(
            &self.tasks,
            &decision.task_a_id,
            &decision.task_b_id,
            &mut self.rng,
        );
        vec![Effect::Persist(self.tasks.relationships())]
    }

    fn on_reset(&mut self) -> Vec<Effect> {
        if !self.is_loaded() {
            return Vec::new();
        }
        tracing::info!("resetting all priorities");
        self.tasks.clear_parents();
        self.history.clear();
        self.pair = select_pair(&self.tasks, &mut self.rng);
        self.status = Some(StatusMessage::info("priorities reset"));
        vec![Effect::Persist(self.tasks.relationships())]
    }

    /// Keep the current pair if it's still valid (refreshing names), else
    /// pick a new one
    fn reselect_pair(&mut self) {
        self.pair = match self.pair.take() {
            Some(old) => {
                select_pair_with_preference(&self.tasks, &old.a.id, &old.b.id, &mut self.rng)
            }
            None => select_pair(&self.tasks, &mut self.rng),
        };
    }
}

/// Startup progress: relationships are loaded once, after the first snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Loading,
    Loaded,
}
