//! # Document
//!
//! One open page together with the state that lives and dies with it.
//!
//! ## Lifecycle
//!
//! ```text
//! create/import/duplicate → edit (history) → snapshot/restore → delete
//! ```
//!
//! Deleting the document drops its history and snapshots with it.

use crate::config::EngineConfig;
use crate::history::{Action, History};
use crate::mutations::MutationError;
use crate::snapshots::SnapshotStore;
use chrono::{DateTime, Utc};
use pagesmith_model::Page;

#[derive(Debug, Clone)]
pub struct Document {
    page: Page,
    history: History,
    snapshots: SnapshotStore,
}

impl Document {
    pub fn new(page: Page, config: &EngineConfig) -> Self {
        Self {
            page,
            history: History::with_limit(config.history.limit),
            snapshots: SnapshotStore::new(config.snapshots.max_manual, config.snapshots.max_auto),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Mutable access for edits that stay outside the undo log (save, publish)
    pub(crate) fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub(crate) fn snapshots_mut(&mut self) -> &mut SnapshotStore {
        &mut self.snapshots
    }

    /// Apply and record an action, then stamp `updated_at`
    pub(crate) fn commit(&mut self, action: Action, now: DateTime<Utc>) -> Result<(), MutationError> {
        self.history.apply(action, &mut self.page)?;
        self.page.touch(now);
        Ok(())
    }

    /// Revert the last applied action; `None` when there is nothing to undo
    pub(crate) fn undo(&mut self, now: DateTime<Utc>) -> Result<Option<Action>, MutationError> {
        let undone = self.history.undo(&mut self.page)?.cloned();
        if undone.is_some() {
            self.page.touch(now);
        }
        Ok(undone)
    }

    pub(crate) fn redo(&mut self, now: DateTime<Utc>) -> Result<Option<Action>, MutationError> {
        let redone = self.history.redo(&mut self.page)?.cloned();
        if redone.is_some() {
            self.page.touch(now);
        }
        Ok(redone)
    }
}
