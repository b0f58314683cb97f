//! Error types for the editor

use crate::export::{ExportError, FormatError};
use crate::mutations::MutationError;
use pagesmith_model::IntegrityError;
use pagesmith_registry::ValidationError;
use std::fmt;
use thiserror::Error;

/// What a [`EditorError::NotFound`] failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Page,
    Component,
    Kind,
    Template,
    Snapshot,
    Group,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Page => "Page",
            Entity::Component => "Component",
            Entity::Kind => "Component kind",
            Entity::Template => "Template",
            Entity::Snapshot => "Snapshot",
            Entity::Group => "Group",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Missing dependencies for {kind}: {}", missing.join(", "))]
    Dependency { kind: String, missing: Vec<String> },

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Inconsistent page tree: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Invalid page JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EditorError {
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        EditorError::NotFound { entity, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EditorError::NotFound { .. })
    }
}
