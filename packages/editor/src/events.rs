//! Typed change notifications, fanned out over a `tokio::sync::broadcast`
//! channel.
//!
//! Every successful engine call publishes exactly one [`EditorEvent`]. The
//! bus never blocks: with no subscribers an event is dropped, and a receiver
//! that falls more than the channel capacity behind observes
//! `RecvError::Lagged`.

use crate::history::ActionType;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EditorEvent {
    PageCreated {
        page_id: String,
        template: Option<String>,
    },
    PageSaved {
        page_id: String,
        version: u64,
    },
    PagePublished {
        page_id: String,
    },
    PageUnpublished {
        page_id: String,
    },
    PageDuplicated {
        page_id: String,
        source_id: String,
    },
    PageDeleted {
        page_id: String,
    },
    PageImported {
        page_id: String,
    },
    PageUpdated {
        page_id: String,
    },
    ComponentAdded {
        page_id: String,
        component_id: String,
        kind: String,
    },
    ComponentRemoved {
        page_id: String,
        component_id: String,
        /// Descendants removed along with the component
        removed: Vec<String>,
    },
    ComponentUpdated {
        page_id: String,
        component_id: String,
    },
    ComponentMoved {
        page_id: String,
        component_id: String,
        parent_id: Option<String>,
        index: usize,
    },
    ComponentsGrouped {
        page_id: String,
        group_id: String,
        component_ids: Vec<String>,
        name: String,
    },
    ComponentsUngrouped {
        page_id: String,
        group_id: String,
        component_ids: Vec<String>,
    },
    ComponentsCopied {
        page_id: String,
        component_ids: Vec<String>,
    },
    ComponentsPasted {
        page_id: String,
        component_ids: Vec<String>,
    },
    ActionUndone {
        page_id: String,
        action_id: String,
        action_type: ActionType,
    },
    ActionRedone {
        page_id: String,
        action_id: String,
        action_type: ActionType,
    },
    SnapshotCreated {
        page_id: String,
        snapshot_id: String,
        is_auto_save: bool,
    },
    SnapshotRestored {
        page_id: String,
        snapshot_id: String,
    },
}

impl EditorEvent {
    pub fn page_id(&self) -> &str {
        match self {
            EditorEvent::PageCreated { page_id, .. }
            | EditorEvent::PageSaved { page_id, .. }
            | EditorEvent::PagePublished { page_id }
            | EditorEvent::PageUnpublished { page_id }
            | EditorEvent::PageDuplicated { page_id, .. }
            | EditorEvent::PageDeleted { page_id }
            | EditorEvent::PageImported { page_id }
            | EditorEvent::PageUpdated { page_id }
            | EditorEvent::ComponentAdded { page_id, .. }
            | EditorEvent::ComponentRemoved { page_id, .. }
            | EditorEvent::ComponentUpdated { page_id, .. }
            | EditorEvent::ComponentMoved { page_id, .. }
            | EditorEvent::ComponentsGrouped { page_id, .. }
            | EditorEvent::ComponentsUngrouped { page_id, .. }
            | EditorEvent::ComponentsCopied { page_id, .. }
            | EditorEvent::ComponentsPasted { page_id, .. }
            | EditorEvent::ActionUndone { page_id, .. }
            | EditorEvent::ActionRedone { page_id, .. }
            | EditorEvent::SnapshotCreated { page_id, .. }
            | EditorEvent::SnapshotRestored { page_id, .. } => page_id,
        }
    }
}

/// Default buffer capacity for the broadcast channel
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out of [`EditorEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to all current subscribers; dropped silently when there are none
    pub fn publish(&self, event: EditorEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
