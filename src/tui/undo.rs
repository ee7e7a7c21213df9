use crate::model::TaskStore;

const HISTORY_LIMIT: usize = 10;

/// One applied choice: `child_id` was ranked below another task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The task that lost the comparison and got a new parent
    pub child_id: String,
    /// Parent before the choice (None = it was a root)
    pub previous_parent_id: Option<String>,
    /// The pair on screen when the choice was made
    pub task_a_id: String,
    pub task_b_id: String,
}

/// Bounded history of the most recent decisions
#[derive(Debug, Clone, Default)]
pub struct DecisionHistory {
    decisions: Vec<Decision>,
}

impl DecisionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision, dropping the oldest past the limit
    pub fn push(&mut self, decision: Decision) {
        self.decisions.push(decision);
        if self.decisions.len() > HISTORY_LIMIT {
            self.decisions.drain(..self.decisions.len() - HISTORY_LIMIT);
        }
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn clear(&mut self) {
        self.decisions.clear();
    }

    pub fn peek_last(&self) -> Option<&Decision> {
        self.decisions.last()
    }

    /// Whether the last decision can be reverted against the current tasks.
    ///
    /// The child must still exist. Restoring a root is always safe; restoring
    /// a parent requires that parent to still exist and be open.
    pub fn can_undo(&self, store: &TaskStore) -> bool {
        let Some(last) = self.decisions.last() else {
            return false;
        };
        if !store.contains(&last.child_id) {
            return false;
        }
        match &last.previous_parent_id {
            None => true,
            Some(parent_id) => store.get(parent_id).is_some_and(|p| p.is_open()),
        }
    }

    /// Revert the last decision in `store` and return it.
    /// Returns None and leaves everything untouched if undo isn't safe.
    pub fn undo(&mut self, store: &mut TaskStore) -> Option<Decision> {
        if !self.can_undo(store) {
            return None;
        }
        let decision = self.decisions.pop()?;
        store.set_parent(&decision.child_id, decision.previous_parent_id.clone());
        Some(decision)
    }
}
