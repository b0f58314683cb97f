//! # Undo/Redo History
//!
//! Per-page action log with a cursor.
//!
//! ## Design
//!
//! - Each action carries the [`Change`]s needed to replay it both ways
//! - `current` points at the last applied action (`None` = nothing applied)
//! - Undo reverts the action at the cursor and steps back
//! - Redo steps forward and reapplies
//! - Recording a new action discards everything after the cursor
//! - Bounded: past the limit the oldest action is dropped (FIFO)

use crate::mutations::{Change, MutationError};
use chrono::{DateTime, Utc};
use pagesmith_model::Page;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AddComponent,
    RemoveComponent,
    UpdateComponent,
    MoveComponent,
    ReorderComponent,
    GroupComponents,
    UngroupComponents,
    PasteComponents,
    UpdatePage,
    RestoreSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMetadata {
    pub timestamp: DateTime<Utc>,
    pub id: String,
}

/// One logged, reversible mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Component, group or page id the action is about
    pub target: String,
    pub changes: Vec<Change>,
    pub metadata: ActionMetadata,
}

impl Action {
    pub fn new(action_type: ActionType, target: impl Into<String>, changes: Vec<Change>, id: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            action_type,
            target: target.into(),
            changes,
            metadata: ActionMetadata { timestamp, id },
        }
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Apply every change in order; on failure the applied prefix is rolled back
    pub fn apply(&self, page: &mut Page) -> Result<(), MutationError> {
        for (done, change) in self.changes.iter().enumerate() {
            if let Err(e) = change.apply(page) {
                for applied in self.changes[..done].iter().rev() {
                    let _ = applied.revert(page);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Revert every change in reverse order; on failure the reverted suffix is reapplied
    pub fn revert(&self, page: &mut Page) -> Result<(), MutationError> {
        for (done, change) in self.changes.iter().rev().enumerate() {
            if let Err(e) = change.revert(page) {
                let reverted = self.changes.len() - done;
                for applied in &self.changes[reverted..] {
                    let _ = applied.apply(page);
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Undo/redo log for one page
#[derive(Debug, Clone)]
pub struct History {
    actions: Vec<Action>,
    current: Option<usize>,
    /// Maximum number of actions kept (0 = unlimited)
    limit: usize,
}

impl History {
    /// Create a history with the default limit (100)
    pub fn new() -> Self {
        Self::with_limit(100)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            actions: Vec::new(),
            current: None,
            limit,
        }
    }

    /// Apply an action to `page` and record it
    pub fn apply(&mut self, action: Action, page: &mut Page) -> Result<(), MutationError> {
        action.apply(page)?;
        self.record(action);
        Ok(())
    }

    /// Record an already-applied action, discarding the redo tail
    pub fn record(&mut self, action: Action) {
        let keep = self.current.map_or(0, |i| i + 1);
        let discarded = self.actions.len() - keep;
        self.actions.truncate(keep);

        self.actions.push(action);
        self.current = Some(self.actions.len() - 1);

        if self.limit > 0 && self.actions.len() > self.limit {
            self.actions.remove(0);
            self.current = self.current.and_then(|i| i.checked_sub(1));
        }

        debug!(actions = self.actions.len(), discarded, "Recorded action");
    }

    /// Revert the action at the cursor; `None` when there is nothing to undo
    pub fn undo(&mut self, page: &mut Page) -> Result<Option<&Action>, MutationError> {
        let Some(index) = self.current else {
            return Ok(None);
        };

        self.actions[index].revert(page)?;
        self.current = index.checked_sub(1);
        Ok(Some(&self.actions[index]))
    }

    /// Reapply the action after the cursor; `None` when already at the tail
    pub fn redo(&mut self, page: &mut Page) -> Result<Option<&Action>, MutationError> {
        let index = self.current.map_or(0, |i| i + 1);
        if index >= self.actions.len() {
            return Ok(None);
        }

        self.actions[index].apply(page)?;
        self.current = Some(index);
        Ok(Some(&self.actions[index]))
    }

    pub fn can_undo(&self) -> bool {
        self.current.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.current.map_or(0, |i| i + 1) < self.actions.len()
    }

    /// Index of the last applied action, `-1` when none
    pub fn current_index(&self) -> isize {
        self.current.map_or(-1, |i| i as isize)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn undo_levels(&self) -> usize {
        self.current.map_or(0, |i| i + 1)
    }

    pub fn redo_levels(&self) -> usize {
        self.actions.len() - self.undo_levels()
    }

    /// Action the next undo would revert
    pub fn peek_undo(&self) -> Option<&Action> {
        self.current.map(|i| &self.actions[i])
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.current = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
