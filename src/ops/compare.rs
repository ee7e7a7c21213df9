use rand::Rng;
use rand::seq::index;

use crate::model::TaskStore;
use crate::ops::levels::{Levels, assign_levels, level};

/// One side of the comparison currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSlot {
    pub id: String,
    /// Name at selection time, used to notice upstream renames
    pub name: String,
}

/// Two distinct tasks from the topmost ambiguous level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub a: PairSlot,
    pub b: PairSlot,
}

impl Pair {
    fn from_ids(store: &TaskStore, a: &str, b: &str) -> Option<Pair> {
        let slot = |id: &str| {
            store.get(id).map(|t| PairSlot {
                id: t.id.clone(),
                name: t.name.clone(),
            })
        };
        Some(Pair {
            a: slot(a)?,
            b: slot(b)?,
        })
    }

    pub fn ids(&self) -> (&str, &str) {
        (&self.a.id, &self.b.id)
    }
}

/// Pick two distinct tasks at random from the topmost ambiguous level.
/// Returns None when every level holds at most one task.
pub fn select_pair<R: Rng + ?Sized>(store: &TaskStore, rng: &mut R) -> Option<Pair> {
    let levels = assign_levels(store);
    random_pair(store, &levels, rng)
}

fn random_pair<R: Rng + ?Sized>(store: &TaskStore, levels: &Levels, rng: &mut R) -> Option<Pair> {
    let bucket = levels.bucket(levels.highest_ambiguous()?);
    let picks = index::sample(rng, bucket.len(), 2);
    Pair::from_ids(store, &bucket[picks.index(0)], &bucket[picks.index(1)])
}

/// Restore a specific pair if both tasks are still in the topmost ambiguous
/// level, otherwise fall back to a random pick.
pub fn select_pair_with_preference<R: Rng + ?Sized>(
    store: &TaskStore,
    preferred_a: &str,
    preferred_b: &str,
    rng: &mut R,
) -> Option<Pair> {
    let levels = assign_levels(store);
    let depth = levels.highest_ambiguous()?;
    if preferred_a != preferred_b
        && levels.contains(depth, preferred_a)
        && levels.contains(depth, preferred_b)
    {
        return Pair::from_ids(store, preferred_a, preferred_b);
    }
    random_pair(store, &levels, rng)
}

/// Whether the pair on screen no longer reflects the forest.
///
/// With no pair set this is true only if there is something to compare; a
/// fully resolved forest with no pair is the stable end state.
pub fn pair_needs_update(pair: Option<&Pair>, store: &TaskStore) -> bool {
    let levels = assign_levels(store);
    let Some(pair) = pair else {
        return levels.highest_ambiguous().is_some();
    };
    let Some(depth) = levels.highest_ambiguous() else {
        return true;
    };
    [&pair.a, &pair.b].into_iter().any(|slot| {
        let Some(task) = store.get(&slot.id) else {
            return true;
        };
        if task.name != slot.name {
            return true;
        }
        match level(task, store) {
            Some(l) if levels.is_resolved_through(l) => true,
            None => true,
            Some(_) => !levels.contains(depth, &slot.id),
        }
    })
}
