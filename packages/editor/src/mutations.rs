//! # Page Changes
//!
//! Reversible structural edits on a [`Page`]. Every engine mutation is
//! expressed as one or more [`Change`]s that carry both the before and the
//! after state, so undo and redo replay them directly without going back
//! through validation.
//!
//! ## Change Semantics
//!
//! ### Insert / Remove
//! - Operate on a whole [`Subtree`]: the root, every descendant and the slot
//!   the root occupies in its parent's `children`
//! - Component-table positions are captured too, so remove + insert restores
//!   the page exactly
//!
//! ### Replace
//! - Swaps one instance for another with the same id
//!
//! ### Move
//! - Detaches the id from one `children` list and inserts it into another
//! - The destination index is taken after the detach

use pagesmith_model::{ComponentInstance, Page, PageMetadata, ParentRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Component {0} cannot have children")]
    NotNestable(String),

    #[error("Component {0} is locked")]
    Locked(String),
}

/// A component and all of its descendants, with the slots they occupied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtree {
    pub parent: ParentRef,
    /// Position of `root` in the parent's `children`
    pub index: usize,
    pub root: String,
    /// `(component-table index, instance)`, ascending by index
    pub nodes: Vec<(usize, ComponentInstance)>,
}

impl Subtree {
    /// Capture `id` and its descendants as they currently sit in `page`
    pub fn capture(page: &Page, id: &str) -> Result<Self, MutationError> {
        let (parent, index) = page
            .parent_of(id)
            .ok_or_else(|| MutationError::InvalidStructure(format!("{} is not attached to the tree", id)))?;

        let mut ids: HashSet<String> = page.descendants(id).into_iter().collect();
        ids.insert(id.to_string());

        let nodes: Vec<(usize, ComponentInstance)> = page
            .components
            .iter()
            .enumerate()
            .filter(|(_, c)| ids.contains(&c.id))
            .map(|(i, c)| (i, c.clone()))
            .collect();
        if !nodes.iter().any(|(_, c)| c.id == id) {
            return Err(MutationError::ComponentNotFound(id.to_string()));
        }

        Ok(Self {
            parent,
            index,
            root: id.to_string(),
            nodes,
        })
    }

    /// A freshly built instance about to be appended under `parent`
    pub fn fresh(page: &Page, parent: ParentRef, instance: ComponentInstance) -> Result<Self, MutationError> {
        let index = page
            .children_of(&parent)
            .map(|children| children.len())
            .ok_or_else(|| parent_not_found(&parent))?;

        Ok(Self {
            parent,
            index,
            root: instance.id.clone(),
            nodes: vec![(page.components.len(), instance)],
        })
    }

    pub fn ids(&self) -> Vec<String> {
        self.nodes.iter().map(|(_, c)| c.id.clone()).collect()
    }

    fn insert_into(&self, page: &mut Page) -> Result<(), MutationError> {
        if self.nodes.iter().any(|(_, c)| page.component(&c.id).is_some()) {
            return Err(MutationError::InvalidStructure(format!("{} is already on the page", self.root)));
        }
        if page.children_of(&self.parent).is_none() {
            return Err(parent_not_found(&self.parent));
        }

        for (index, instance) in &self.nodes {
            let at = (*index).min(page.components.len());
            page.components.insert(at, instance.clone());
        }
        if let Some(children) = page.children_of_mut(&self.parent) {
            let at = self.index.min(children.len());
            children.insert(at, self.root.clone());
        }
        Ok(())
    }

    fn remove_from(&self, page: &mut Page) -> Result<(), MutationError> {
        if page.component(&self.root).is_none() {
            return Err(MutationError::ComponentNotFound(self.root.clone()));
        }

        let children = page
            .children_of_mut(&self.parent)
            .ok_or_else(|| parent_not_found(&self.parent))?;
        children.retain(|c| *c != self.root);

        let ids: HashSet<&str> = self.nodes.iter().map(|(_, c)| c.id.as_str()).collect();
        page.components.retain(|c| !ids.contains(c.id.as_str()));
        Ok(())
    }
}

/// One reversible edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Change {
    Insert(Subtree),
    Remove(Subtree),
    Replace {
        before: Box<ComponentInstance>,
        after: Box<ComponentInstance>,
    },
    Move {
        id: String,
        from: (ParentRef, usize),
        to: (ParentRef, usize),
    },
    /// Display name of a group (`None` = no entry)
    SetGroupName {
        group_id: String,
        before: Option<String>,
        after: Option<String>,
    },
    SetMetadata {
        before: Box<PageMetadata>,
        after: Box<PageMetadata>,
    },
    SetTags {
        before: BTreeSet<String>,
        after: BTreeSet<String>,
    },
    /// Swap of the page content (snapshot restore)
    ReplacePage {
        before: Box<Page>,
        after: Box<Page>,
    },
}

impl Change {
    /// Apply the forward edit
    pub fn apply(&self, page: &mut Page) -> Result<(), MutationError> {
        match self {
            Change::Insert(subtree) => subtree.insert_into(page),
            Change::Remove(subtree) => subtree.remove_from(page),
            Change::Replace { after, .. } => Self::apply_replace(page, after),
            Change::Move { id, from, to } => Self::apply_move(page, id, from, to),
            Change::SetGroupName { group_id, after, .. } => {
                Self::apply_group_name(page, group_id, after);
                Ok(())
            }
            Change::SetMetadata { after, .. } => {
                page.metadata = (**after).clone();
                Ok(())
            }
            Change::SetTags { after, .. } => {
                page.tags = after.clone();
                Ok(())
            }
            Change::ReplacePage { after, .. } => {
                Self::apply_page_content(page, after);
                Ok(())
            }
        }
    }

    /// Apply the backward edit
    pub fn revert(&self, page: &mut Page) -> Result<(), MutationError> {
        match self {
            Change::Insert(subtree) => subtree.remove_from(page),
            Change::Remove(subtree) => subtree.insert_into(page),
            Change::Replace { before, .. } => Self::apply_replace(page, before),
            Change::Move { id, from, to } => Self::apply_move(page, id, to, from),
            Change::SetGroupName { group_id, before, .. } => {
                Self::apply_group_name(page, group_id, before);
                Ok(())
            }
            Change::SetMetadata { before, .. } => {
                page.metadata = (**before).clone();
                Ok(())
            }
            Change::SetTags { before, .. } => {
                page.tags = before.clone();
                Ok(())
            }
            Change::ReplacePage { before, .. } => {
                Self::apply_page_content(page, before);
                Ok(())
            }
        }
    }

    /// Copy the editable content of `source` onto `page`
    ///
    /// Identity, `version` and publish state stay with the live page.
    fn apply_page_content(page: &mut Page, source: &Page) {
        page.layout = source.layout.clone();
        page.components = source.components.clone();
        page.styles = source.styles.clone();
        page.settings = source.settings.clone();
        page.metadata = source.metadata.clone();
        page.tags = source.tags.clone();
        page.groups = source.groups.clone();
    }

    fn apply_replace(page: &mut Page, instance: &ComponentInstance) -> Result<(), MutationError> {
        let slot = page
            .component_mut(&instance.id)
            .ok_or_else(|| MutationError::ComponentNotFound(instance.id.clone()))?;
        *slot = instance.clone();
        Ok(())
    }

    fn apply_move(
        page: &mut Page,
        id: &str,
        from: &(ParentRef, usize),
        to: &(ParentRef, usize),
    ) -> Result<(), MutationError> {
        if page.component(id).is_none() {
            return Err(MutationError::ComponentNotFound(id.to_string()));
        }
        if page.children_of(&to.0).is_none() {
            return Err(parent_not_found(&to.0));
        }

        let source = page
            .children_of_mut(&from.0)
            .ok_or_else(|| parent_not_found(&from.0))?;
        let Some(position) = source.iter().position(|c| c == id) else {
            return Err(MutationError::InvalidStructure(format!("{} is not under {:?}", id, from.0)));
        };
        source.remove(position);

        if let Some(target) = page.children_of_mut(&to.0) {
            let at = to.1.min(target.len());
            target.insert(at, id.to_string());
        }
        Ok(())
    }

    fn apply_group_name(page: &mut Page, group_id: &str, name: &Option<String>) {
        match name {
            Some(name) => {
                page.groups.insert(group_id.to_string(), name.clone());
            }
            None => {
                page.groups.remove(group_id);
            }
        }
    }
}

fn parent_not_found(parent: &ParentRef) -> MutationError {
    match parent {
        ParentRef::Layout => MutationError::ParentNotFound("layout".to_string()),
        ParentRef::Component(id) => MutationError::ParentNotFound(id.clone()),
    }
}
