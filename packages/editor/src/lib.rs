//! # Pagesmith Editor
//!
//! Page editing engine: the page table, the mutation API, undo/redo history,
//! snapshots, the shared clipboard and export.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ registry: component kinds, templates, themes│
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Engine                              │
//! │  - Documents (page + history + snapshots)   │
//! │  - Mutations as reversible Changes          │
//! │  - Typed events on a broadcast bus          │
//! │  - Autosave driven by tick()                │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compilers: html / react / vue / json        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Page is source of truth**: exports are derived views
//! 2. **Every edit is reversible**: an action stores before and after state
//! 3. **Undo replays, never re-validates**: history does not call back into the API
//! 4. **Single writer**: callers serialize edits to a page

mod clipboard;
mod config;
mod document;
mod engine;
mod errors;
mod events;
mod export;
mod history;
mod mutations;
mod snapshots;

pub use clipboard::Clipboard;
pub use config::{ClipboardConfig, DependencyPolicy, EngineConfig, HistoryConfig, SnapshotConfig};
pub use document::Document;
pub use engine::{AddOptions, ComponentUpdate, Engine, PageFilter, PageOptions};
pub use errors::{EditorError, Entity};
pub use events::{EditorEvent, EventBus, DEFAULT_CAPACITY};
pub use export::{export_page, ExportError, ExportFormat, FormatError};
pub use history::{Action, ActionMetadata, ActionType, History};
pub use mutations::{Change, MutationError, Subtree};
pub use snapshots::{AutosaveTimer, Snapshot, SnapshotStore};
