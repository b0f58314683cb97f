use crate::definition::ComponentDefinition;
use crate::Registry;
use pagesmith_model::{ComponentInstance, Page};
use std::collections::HashSet;
use tracing::warn;

/// An instance paired with its kind, plus its resolvable children
#[derive(Debug, Clone)]
pub struct ResolvedNode<'a> {
    pub instance: &'a ComponentInstance,
    pub definition: &'a ComponentDefinition,
    pub children: Vec<ResolvedNode<'a>>,
}

impl<'a> ResolvedNode<'a> {
    /// This node and every descendant, depth-first
    pub fn walk(&self) -> Vec<&ResolvedNode<'a>> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}

impl Registry {
    /// Resolve the page tree for rendering
    ///
    /// Child ids with no instance and instances of unknown kinds are skipped
    /// (with their subtrees) and logged, so one broken reference never sinks
    /// a whole export.
    pub fn resolve_tree<'a>(&'a self, page: &'a Page) -> Vec<ResolvedNode<'a>> {
        let mut visited = HashSet::new();
        self.resolve_children(page, &page.layout.children, &mut visited)
    }

    fn resolve_children<'a>(
        &'a self,
        page: &'a Page,
        ids: &'a [String],
        visited: &mut HashSet<&'a str>,
    ) -> Vec<ResolvedNode<'a>> {
        let mut nodes = Vec::with_capacity(ids.len());

        for id in ids {
            if !visited.insert(id.as_str()) {
                warn!(page_id = %page.id, component_id = %id, "Skipping component referenced twice");
                continue;
            }
            let Some(instance) = page.component(id) else {
                warn!(page_id = %page.id, component_id = %id, "Skipping missing component");
                continue;
            };
            let Some(definition) = self.component(&instance.component_id) else {
                warn!(
                    page_id = %page.id,
                    component_id = %id,
                    kind = %instance.component_id,
                    "Skipping component of unknown kind"
                );
                continue;
            };

            nodes.push(ResolvedNode {
                instance,
                definition,
                children: self.resolve_children(page, instance.child_ids(), visited),
            });
        }

        nodes
    }
}
