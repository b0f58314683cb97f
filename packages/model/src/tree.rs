//! Tree lookups over a page's layout and component table.
//!
//! The page is a tree, not a DAG: every component id appears in exactly one
//! `children` list, either the root layout's or a nestable component's.

use crate::component::ComponentInstance;
use crate::page::Page;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Which `children` list an instance hangs off
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum ParentRef {
    Layout,
    Component(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrityError {
    #[error("Child {child} of {parent:?} does not resolve to a component")]
    DanglingChild { parent: ParentRef, child: String },

    #[error("Component {0} appears under more than one parent")]
    MultipleParents(String),

    #[error("Component {0} is not reachable from the root layout")]
    Orphaned(String),

    #[error("Component id {0} is used by more than one instance")]
    DuplicateId(String),
}

impl Page {
    pub fn component(&self, id: &str) -> Option<&ComponentInstance> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn component_mut(&mut self, id: &str) -> Option<&mut ComponentInstance> {
        self.components.iter_mut().find(|c| c.id == id)
    }

    /// Index of an instance in the flat component table
    pub fn component_index(&self, id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }

    pub fn children_of(&self, parent: &ParentRef) -> Option<&[String]> {
        match parent {
            ParentRef::Layout => Some(&self.layout.children),
            ParentRef::Component(id) => self.component(id)?.children.as_deref(),
        }
    }

    pub fn children_of_mut(&mut self, parent: &ParentRef) -> Option<&mut Vec<String>> {
        match parent {
            ParentRef::Layout => Some(&mut self.layout.children),
            ParentRef::Component(id) => self.component_mut(id)?.children.as_mut(),
        }
    }

    /// The parent list holding `id` and the index within it
    pub fn parent_of(&self, id: &str) -> Option<(ParentRef, usize)> {
        if let Some(index) = self.layout.children.iter().position(|c| c == id) {
            return Some((ParentRef::Layout, index));
        }

        self.components.iter().find_map(|component| {
            component
                .child_ids()
                .iter()
                .position(|c| c == id)
                .map(|index| (ParentRef::Component(component.id.clone()), index))
        })
    }

    /// All descendants of `id`, depth-first in children order (excluding `id`)
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        self.collect_descendants(id, &mut out, &mut visited);
        out
    }

    fn collect_descendants(&self, id: &str, out: &mut Vec<String>, visited: &mut HashSet<String>) {
        let Some(component) = self.component(id) else {
            return;
        };
        for child in component.child_ids() {
            if visited.insert(child.clone()) {
                out.push(child.clone());
                self.collect_descendants(child, out, visited);
            }
        }
    }

    /// Reachable instances in render order: depth-first from the root layout,
    /// following each `children` list in order and skipping ids that do not
    /// resolve
    pub fn tree_order(&self) -> Vec<&ComponentInstance> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<&String> = self.layout.children.iter().rev().collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id.as_str()) {
                continue;
            }
            if let Some(component) = self.component(id) {
                out.push(component);
                stack.extend(component.child_ids().iter().rev());
            }
        }

        out
    }

    /// Moving `id` under `new_parent` would make it its own ancestor
    pub fn would_create_cycle(&self, id: &str, new_parent: &ParentRef) -> bool {
        match new_parent {
            ParentRef::Layout => false,
            ParentRef::Component(parent_id) => {
                parent_id == id || self.descendants(id).iter().any(|d| d == parent_id)
            }
        }
    }

    /// `max(zIndex) + 1`, or 1 on an empty page
    pub fn next_z_index(&self) -> i64 {
        self.components
            .iter()
            .map(|c| c.position.z_index)
            .max()
            .map_or(1, |max| max.max(0) + 1)
    }

    /// `min(zIndex) - 1`, or 0 on an empty page
    pub fn lowest_z_index(&self) -> i64 {
        self.components
            .iter()
            .map(|c| c.position.z_index)
            .min()
            .map_or(0, |min| min - 1)
    }

    /// Group member ids in component-table order
    pub fn group_members(&self, group_id: &str) -> Vec<String> {
        self.components
            .iter()
            .filter(|c| c.grouped.as_deref() == Some(group_id))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Every child id resolves, no id has two parents, every instance is reachable
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let mut ids = HashSet::new();
        for component in &self.components {
            if !ids.insert(component.id.as_str()) {
                return Err(IntegrityError::DuplicateId(component.id.clone()));
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut lists: Vec<(ParentRef, &[String])> = vec![(ParentRef::Layout, self.layout.children.as_slice())];
        for component in &self.components {
            if let Some(children) = &component.children {
                lists.push((ParentRef::Component(component.id.clone()), children.as_slice()));
            }
        }

        for (parent, children) in lists {
            for child in children {
                if !ids.contains(child.as_str()) {
                    return Err(IntegrityError::DanglingChild {
                        parent,
                        child: child.clone(),
                    });
                }
                if !seen.insert(child.as_str()) {
                    return Err(IntegrityError::MultipleParents(child.clone()));
                }
            }
        }

        let mut reachable: HashSet<String> = HashSet::new();
        for root in &self.layout.children {
            reachable.insert(root.clone());
            reachable.extend(self.descendants(root));
        }
        if let Some(orphan) = self.components.iter().find(|c| !reachable.contains(&c.id)) {
            return Err(IntegrityError::Orphaned(orphan.id.clone()));
        }

        Ok(())
    }

    /// Drop child ids that do not resolve to a live instance; returns how many
    pub fn prune_dangling(&mut self) -> usize {
        let ids: HashSet<String> = self.components.iter().map(|c| c.id.clone()).collect();
        let mut pruned = 0;

        let before = self.layout.children.len();
        self.layout.children.retain(|id| ids.contains(id));
        pruned += before - self.layout.children.len();

        for component in &mut self.components {
            if let Some(children) = &mut component.children {
                let before = children.len();
                children.retain(|id| ids.contains(id));
                pruned += before - children.len();
            }
        }

        pruned
    }

    /// Give every instance a fresh id and rewrite every internal reference
    ///
    /// Returns the old → new mapping.
    pub fn remap_component_ids(&mut self, mut next_id: impl FnMut() -> String) -> HashMap<String, String> {
        let mapping: HashMap<String, String> = self
            .components
            .iter()
            .map(|c| (c.id.clone(), next_id()))
            .collect();

        let remap = |id: &mut String| {
            if let Some(new_id) = mapping.get(id.as_str()) {
                *id = new_id.clone();
            }
        };

        self.layout.children.iter_mut().for_each(remap);
        for component in &mut self.components {
            remap(&mut component.id);
            if let Some(children) = &mut component.children {
                children.iter_mut().for_each(remap);
            }
        }

        mapping
    }
}
