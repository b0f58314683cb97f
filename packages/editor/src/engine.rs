//! # Engine
//!
//! Owns the page table and is the only way to change it.
//!
//! Every successful mutation:
//! 1. is validated against the page and the component registry
//! 2. is applied as one [`Action`] and recorded in the page's history
//! 3. publishes exactly one [`EditorEvent`]
//!
//! Read accessors hand out shared references into the live table; edits go
//! through the methods here, never through those references.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagesmith_editor::{Engine, EngineConfig, PageOptions, AddOptions};
//! use pagesmith_model::Point;
//! use pagesmith_registry::Registry;
//! use std::sync::Arc;
//!
//! let mut engine = Engine::new(Arc::new(Registry::builtin()), EngineConfig::default());
//! let page_id = engine.create_page(None, PageOptions::default())?.id.clone();
//! let hero = engine.add_component(&page_id, "hero", Point::new(0.0, 0.0), AddOptions::default())?;
//! engine.remove_component(&page_id, &hero.id)?;
//! engine.undo(&page_id)?;
//! let html = engine.export_page(&page_id, "html")?;
//! ```

use crate::clipboard::Clipboard;
use crate::config::{DependencyPolicy, EngineConfig};
use crate::document::Document;
use crate::errors::{EditorError, Entity};
use crate::events::{EditorEvent, EventBus};
use crate::export::{self, ExportFormat};
use crate::history::{Action, ActionType};
use crate::mutations::{Change, MutationError, Subtree};
use crate::snapshots::{AutosaveTimer, Snapshot};
use chrono::{DateTime, Utc};
use pagesmith_common::{slugify, unique_slug, IdGenerator};
use pagesmith_model::{
    Animation, ComponentInstance, Interaction, Page, PageMetadata, ParentRef, Point, Position, Props,
    ResponsiveOverrides, StyleRecord, Visibility,
};
use pagesmith_registry::{Constraint, Registry, ValidationError};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Name and slug for a new page; both derived when absent
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PageFilter {
    pub published: Option<bool>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Overlaid on the kind's default props
    pub props: Props,
    /// Appended after the kind's default styles
    pub styles: Vec<StyleRecord>,
    /// Nestable component to insert under; the root layout when `None`
    pub parent_id: Option<String>,
}

/// Partial update for one component; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct ComponentUpdate {
    pub name: Option<String>,
    /// Merged key-wise into the existing props
    pub props: Option<Props>,
    pub styles: Option<Vec<StyleRecord>>,
    pub interactions: Option<Vec<Interaction>>,
    pub position: Option<Position>,
    pub visibility: Option<Visibility>,
    /// `Some(None)` clears the animation
    pub animation: Option<Option<Animation>>,
    pub responsive: Option<Option<ResponsiveOverrides>>,
    pub locked: Option<bool>,
}

pub struct Engine {
    registry: Arc<Registry>,
    config: EngineConfig,
    documents: HashMap<String, Document>,
    ids: IdGenerator,
    clipboard: Clipboard,
    events: EventBus,
    autosave: AutosaveTimer,
}

impl Engine {
    pub fn new(registry: Arc<Registry>, config: EngineConfig) -> Self {
        let autosave = AutosaveTimer::from_secs(config.snapshots.autosave_interval_secs);

        Self {
            registry,
            config,
            documents: HashMap::new(),
            ids: IdGenerator::new(),
            clipboard: Clipboard::new(),
            events: EventBus::default(),
            autosave,
        }
    }

    /// Share a copy buffer with other engines
    pub fn with_clipboard(mut self, clipboard: Clipboard) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    // ---------------------------------------------------------------
    // Pages
    // ---------------------------------------------------------------

    /// Create a blank page, or a deep copy of a registered template
    #[instrument(skip(self, options))]
    pub fn create_page(&mut self, template: Option<&str>, options: PageOptions) -> Result<&Page, EditorError> {
        let now = Utc::now();
        let page_id = self.ids.new_id();

        let mut page = match template {
            None => {
                let name = options.name.clone().unwrap_or_else(|| "New Page".to_string());
                Page::blank(page_id.clone(), name, String::new(), now)
            }
            Some(template_id) => {
                let template = self
                    .registry
                    .template(template_id)
                    .ok_or_else(|| EditorError::not_found(Entity::Template, template_id))?;

                let mut page = template.clone();
                page.id = page_id.clone();
                page.name = options.name.clone().unwrap_or_else(|| format!("{} Copy", template.name));
                page.parent_id = None;
                self.reset_copy(&mut page, now);
                page
            }
        };

        let requested = options.slug.unwrap_or_else(|| page.name.clone());
        page.slug = self.unique_slug_for(&requested);

        info!(page_id = %page.id, slug = %page.slug, components = page.components.len(), "Created page");
        self.insert_document(page);
        self.events.publish(EditorEvent::PageCreated {
            page_id: page_id.clone(),
            template: template.map(str::to_string),
        });

        self.page(&page_id)
    }

    pub fn page(&self, page_id: &str) -> Result<&Page, EditorError> {
        self.document(page_id).map(Document::page)
    }

    pub fn document(&self, page_id: &str) -> Result<&Document, EditorError> {
        self.documents
            .get(page_id)
            .ok_or_else(|| EditorError::not_found(Entity::Page, page_id))
    }

    /// Pages matching `filter`, most recently updated first
    pub fn pages(&self, filter: &PageFilter) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self
            .documents
            .values()
            .map(Document::page)
            .filter(|page| filter.published.map_or(true, |published| page.is_published == published))
            .filter(|page| filter.tag.as_ref().map_or(true, |tag| page.tags.contains(tag)))
            .collect();
        sort_recent_first(&mut pages);
        pages
    }

    pub fn search_pages(&self, query: &str) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self
            .documents
            .values()
            .map(Document::page)
            .filter(|page| page.matches_query(query))
            .collect();
        sort_recent_first(&mut pages);
        pages
    }

    /// Commit the page: bump `version` and `updated_at`; returns the new version
    pub fn save_page(&mut self, page_id: &str) -> Result<u64, EditorError> {
        let page = self.document_mut(page_id)?.page_mut();
        page.version += 1;
        page.touch(Utc::now());
        let version = page.version;

        info!(page_id, version, "Saved page");
        self.events.publish(EditorEvent::PageSaved {
            page_id: page_id.to_string(),
            version,
        });
        Ok(version)
    }

    pub fn publish_page(&mut self, page_id: &str) -> Result<(), EditorError> {
        let now = Utc::now();
        let page = self.document_mut(page_id)?.page_mut();
        page.is_published = true;
        page.published_at = Some(now);
        page.touch(now);

        info!(page_id, "Published page");
        self.events.publish(EditorEvent::PagePublished {
            page_id: page_id.to_string(),
        });
        Ok(())
    }

    pub fn unpublish_page(&mut self, page_id: &str) -> Result<(), EditorError> {
        let page = self.document_mut(page_id)?.page_mut();
        page.is_published = false;
        page.published_at = None;
        page.touch(Utc::now());

        info!(page_id, "Unpublished page");
        self.events.publish(EditorEvent::PageUnpublished {
            page_id: page_id.to_string(),
        });
        Ok(())
    }

    /// Deep copy with fresh page and component ids; the copy records its source in `parent_id`
    #[instrument(skip(self))]
    pub fn duplicate_page(&mut self, page_id: &str, name: Option<&str>) -> Result<&Page, EditorError> {
        let now = Utc::now();
        let mut page = self.page(page_id)?.clone();

        let new_id = self.ids.new_id();
        page.name = name.map(str::to_string).unwrap_or_else(|| format!("{} Copy", page.name));
        page.id = new_id.clone();
        page.parent_id = Some(page_id.to_string());
        self.reset_copy(&mut page, now);
        page.slug = self.unique_slug_for(&page.name);

        info!(source_id = page_id, page_id = %new_id, "Duplicated page");
        self.insert_document(page);
        self.events.publish(EditorEvent::PageDuplicated {
            page_id: new_id.clone(),
            source_id: page_id.to_string(),
        });

        self.page(&new_id)
    }

    /// Drop the page along with its history and snapshots
    pub fn delete_page(&mut self, page_id: &str) -> Result<(), EditorError> {
        self.documents
            .remove(page_id)
            .ok_or_else(|| EditorError::not_found(Entity::Page, page_id))?;

        info!(page_id, "Deleted page");
        self.events.publish(EditorEvent::PageDeleted {
            page_id: page_id.to_string(),
        });
        Ok(())
    }

    /// Load a page from its JSON export
    ///
    /// A colliding id is replaced with a fresh one. The slug is normalized and
    /// gets a numeric suffix if taken. The imported page starts with an empty
    /// history.
    #[instrument(skip_all)]
    pub fn import_page(&mut self, source: &str) -> Result<&Page, EditorError> {
        let mut page = Page::from_json(source)?;

        let pruned = page.prune_dangling();
        if pruned > 0 {
            warn!(page_id = %page.id, pruned, "Dropped child ids that do not resolve");
        }
        page.check_integrity()?;

        if self.documents.contains_key(&page.id) {
            page.id = self.ids.new_id();
        }
        page.slug = self.unique_slug_for(&page.slug);

        let page_id = page.id.clone();
        info!(page_id = %page_id, components = page.components.len(), "Imported page");
        self.insert_document(page);
        self.events.publish(EditorEvent::PageImported {
            page_id: page_id.clone(),
        });

        self.page(&page_id)
    }

    pub fn update_page_metadata(&mut self, page_id: &str, metadata: PageMetadata) -> Result<(), EditorError> {
        let before = self.page(page_id)?.metadata.clone();
        let change = Change::SetMetadata {
            before: Box::new(before),
            after: Box::new(metadata),
        };

        self.commit(page_id, ActionType::UpdatePage, page_id, vec![change])?;
        self.events.publish(EditorEvent::PageUpdated {
            page_id: page_id.to_string(),
        });
        Ok(())
    }

    pub fn set_page_tags<I, S>(&mut self, page_id: &str, tags: I) -> Result<(), EditorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.page(page_id)?.tags.clone();
        let after: BTreeSet<String> = tags.into_iter().map(Into::into).collect();

        self.commit(page_id, ActionType::UpdatePage, page_id, vec![Change::SetTags { before, after }])?;
        self.events.publish(EditorEvent::PageUpdated {
            page_id: page_id.to_string(),
        });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------

    /// Place a new instance of `kind` on the page, above every existing component
    #[instrument(skip(self, options))]
    pub fn add_component(
        &mut self,
        page_id: &str,
        kind: &str,
        at: Point,
        options: AddOptions,
    ) -> Result<ComponentInstance, EditorError> {
        let component_id = self.ids.new_id();
        let page = self.page(page_id)?;

        if self.registry.component(kind).is_none() {
            return Err(EditorError::not_found(Entity::Kind, kind));
        }
        let parent = self.nestable_parent(page, options.parent_id.as_deref())?;

        let missing = self.registry.missing_dependencies(kind, page);
        if !missing.is_empty() {
            match self.config.dependency_policy {
                DependencyPolicy::Warn => {
                    warn!(page_id, kind, missing = ?missing, "Component dependencies are not on the page");
                }
                DependencyPolicy::Reject => {
                    return Err(EditorError::Dependency {
                        kind: kind.to_string(),
                        missing,
                    });
                }
            }
        }

        let mut instance = self
            .registry
            .instantiate(kind, component_id, options.props, at, page.next_z_index())
            .map_err(|_| EditorError::not_found(Entity::Kind, kind))?;
        instance.styles.extend(options.styles);
        self.registry.validate_props(kind, &instance.props)?;

        let change = Change::Insert(Subtree::fresh(page, parent, instance.clone())?);
        self.commit(page_id, ActionType::AddComponent, &instance.id, vec![change])?;

        info!(page_id, component_id = %instance.id, z_index = instance.position.z_index, "Added component");
        self.events.publish(EditorEvent::ComponentAdded {
            page_id: page_id.to_string(),
            component_id: instance.id.clone(),
            kind: kind.to_string(),
        });
        Ok(instance)
    }

    /// Remove a component together with all of its descendants
    #[instrument(skip(self))]
    pub fn remove_component(&mut self, page_id: &str, component_id: &str) -> Result<(), EditorError> {
        let page = self.page(page_id)?;
        if page.component(component_id).is_none() {
            return Err(EditorError::not_found(Entity::Component, component_id));
        }

        let subtree = Subtree::capture(page, component_id)?;
        let removed: Vec<String> = subtree.ids().into_iter().filter(|id| id != component_id).collect();
        self.commit(page_id, ActionType::RemoveComponent, component_id, vec![Change::Remove(subtree)])?;

        info!(page_id, component_id, descendants = removed.len(), "Removed component");
        self.events.publish(EditorEvent::ComponentRemoved {
            page_id: page_id.to_string(),
            component_id: component_id.to_string(),
            removed,
        });
        Ok(())
    }

    /// Apply a partial update; returns the component as it now stands
    ///
    /// Props are merged and the merged bag is validated against the kind.
    /// A locked component keeps its position unless the same update unlocks it.
    pub fn update_component(
        &mut self,
        page_id: &str,
        component_id: &str,
        update: ComponentUpdate,
    ) -> Result<ComponentInstance, EditorError> {
        let before = self.component(page_id, component_id)?.clone();
        let mut after = before.clone();

        if let Some(position) = update.position {
            if before.locked && update.locked != Some(false) && position != before.position {
                return Err(MutationError::Locked(component_id.to_string()).into());
            }
            after.position = position;
        }
        if let Some(props) = update.props {
            after.props.extend(props);
        }
        self.registry.validate_props(&after.component_id, &after.props)?;

        if let Some(name) = update.name {
            after.name = name;
        }
        if let Some(styles) = update.styles {
            after.styles = styles;
        }
        if let Some(interactions) = update.interactions {
            after.interactions = interactions;
        }
        if let Some(visibility) = update.visibility {
            after.visibility = visibility;
        }
        if let Some(animation) = update.animation {
            after.animation = animation;
        }
        if let Some(responsive) = update.responsive {
            after.responsive = responsive;
        }
        if let Some(locked) = update.locked {
            after.locked = locked;
        }

        let change = Change::Replace {
            before: Box::new(before),
            after: Box::new(after.clone()),
        };
        self.commit(page_id, ActionType::UpdateComponent, component_id, vec![change])?;

        debug!(page_id, component_id, "Updated component");
        self.events.publish(EditorEvent::ComponentUpdated {
            page_id: page_id.to_string(),
            component_id: component_id.to_string(),
        });
        Ok(after)
    }

    /// Reparent or reorder a component
    ///
    /// `index` is the position in the destination list once the component has
    /// been detached, clamped to its length. Returns the index actually used.
    #[instrument(skip(self))]
    pub fn move_component(
        &mut self,
        page_id: &str,
        component_id: &str,
        parent_id: Option<&str>,
        index: usize,
    ) -> Result<usize, EditorError> {
        let page = self.page(page_id)?;
        let component = page
            .component(component_id)
            .ok_or_else(|| EditorError::not_found(Entity::Component, component_id))?;
        if component.locked {
            return Err(MutationError::Locked(component_id.to_string()).into());
        }

        let to_parent = match parent_id {
            None => ParentRef::Layout,
            Some(parent_id) => {
                let parent = page
                    .component(parent_id)
                    .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
                if !parent.is_nestable() {
                    return Err(MutationError::NotNestable(parent_id.to_string()).into());
                }
                ParentRef::Component(parent_id.to_string())
            }
        };
        if page.would_create_cycle(component_id, &to_parent) {
            return Err(MutationError::CycleDetected.into());
        }

        let from = page.parent_of(component_id).ok_or_else(|| {
            MutationError::InvalidStructure(format!("{} is not attached to the tree", component_id))
        })?;
        let same_parent = from.0 == to_parent;
        let target_len = page.children_of(&to_parent).map_or(0, <[String]>::len);
        let index = index.min(if same_parent { target_len.saturating_sub(1) } else { target_len });

        let action_type = if same_parent {
            ActionType::ReorderComponent
        } else {
            ActionType::MoveComponent
        };
        let change = Change::Move {
            id: component_id.to_string(),
            from,
            to: (to_parent, index),
        };
        self.commit(page_id, action_type, component_id, vec![change])?;

        debug!(page_id, component_id, index, "Moved component");
        self.events.publish(EditorEvent::ComponentMoved {
            page_id: page_id.to_string(),
            component_id: component_id.to_string(),
            parent_id: parent_id.map(str::to_string),
            index,
        });
        Ok(index)
    }

    /// Raise above every other component; returns the new z-index
    pub fn bring_to_front(&mut self, page_id: &str, component_id: &str) -> Result<i64, EditorError> {
        self.restack(page_id, component_id, true)
    }

    /// Lower beneath every other component; returns the new z-index
    pub fn send_to_back(&mut self, page_id: &str, component_id: &str) -> Result<i64, EditorError> {
        self.restack(page_id, component_id, false)
    }

    fn restack(&mut self, page_id: &str, component_id: &str, front: bool) -> Result<i64, EditorError> {
        let page = self.page(page_id)?;
        let before = page
            .component(component_id)
            .ok_or_else(|| EditorError::not_found(Entity::Component, component_id))?;
        if before.locked {
            return Err(MutationError::Locked(component_id.to_string()).into());
        }

        let z_index = if front {
            page.next_z_index()
        } else {
            page.lowest_z_index()
        };
        let mut after = before.clone();
        after.position.z_index = z_index;
        let change = Change::Replace {
            before: Box::new(before.clone()),
            after: Box::new(after),
        };
        self.commit(page_id, ActionType::ReorderComponent, component_id, vec![change])?;

        debug!(page_id, component_id, z_index, "Restacked component");
        self.events.publish(EditorEvent::ComponentUpdated {
            page_id: page_id.to_string(),
            component_id: component_id.to_string(),
        });
        Ok(z_index)
    }

    // ---------------------------------------------------------------
    // Groups
    // ---------------------------------------------------------------

    /// Tag two or more components with a shared, new group id; returns the group id
    pub fn group_components(
        &mut self,
        page_id: &str,
        component_ids: &[String],
        name: Option<&str>,
    ) -> Result<String, EditorError> {
        let group_id = self.ids.new_id();
        let page = self.page(page_id)?;

        let mut members: Vec<&str> = Vec::with_capacity(component_ids.len());
        for id in component_ids {
            if !members.contains(&id.as_str()) {
                members.push(id);
            }
        }
        if members.len() < 2 {
            return Err(ValidationError::new("ids", Constraint::MinItems(2)).into());
        }

        let mut changes = Vec::with_capacity(members.len() + 1);
        for id in &members {
            let before = page
                .component(id)
                .ok_or_else(|| EditorError::not_found(Entity::Component, *id))?;
            let mut after = before.clone();
            after.grouped = Some(group_id.clone());
            changes.push(Change::Replace {
                before: Box::new(before.clone()),
                after: Box::new(after),
            });
        }

        let name = name.map_or_else(|| default_group_name(&group_id), str::to_string);
        changes.push(Change::SetGroupName {
            group_id: group_id.clone(),
            before: page.groups.get(&group_id).cloned(),
            after: Some(name.clone()),
        });
        let component_ids: Vec<String> = members.into_iter().map(str::to_string).collect();

        self.commit(page_id, ActionType::GroupComponents, &group_id, changes)?;

        info!(page_id, group_id = %group_id, members = component_ids.len(), "Grouped components");
        self.events.publish(EditorEvent::ComponentsGrouped {
            page_id: page_id.to_string(),
            group_id: group_id.clone(),
            component_ids,
            name,
        });
        Ok(group_id)
    }

    /// Clear a group id from every member; returns the former members
    pub fn ungroup_components(&mut self, page_id: &str, group_id: &str) -> Result<Vec<String>, EditorError> {
        let page = self.page(page_id)?;
        let members = page.group_members(group_id);
        let name = page.groups.get(group_id).cloned();
        if members.is_empty() && name.is_none() {
            return Err(EditorError::not_found(Entity::Group, group_id));
        }

        let mut changes = Vec::with_capacity(members.len() + 1);
        for id in &members {
            if let Some(before) = page.component(id) {
                let mut after = before.clone();
                after.grouped = None;
                changes.push(Change::Replace {
                    before: Box::new(before.clone()),
                    after: Box::new(after),
                });
            }
        }
        changes.push(Change::SetGroupName {
            group_id: group_id.to_string(),
            before: name,
            after: None,
        });

        self.commit(page_id, ActionType::UngroupComponents, group_id, changes)?;

        info!(page_id, group_id, members = members.len(), "Ungrouped components");
        self.events.publish(EditorEvent::ComponentsUngrouped {
            page_id: page_id.to_string(),
            group_id: group_id.to_string(),
            component_ids: members.clone(),
        });
        Ok(members)
    }

    // ---------------------------------------------------------------
    // Clipboard
    // ---------------------------------------------------------------

    /// Replace the clipboard with copies of the named components; returns how many
    pub fn copy_components(&mut self, page_id: &str, component_ids: &[String]) -> Result<usize, EditorError> {
        let page = self.page(page_id)?;
        let items = component_ids
            .iter()
            .map(|id| {
                page.component(id)
                    .cloned()
                    .ok_or_else(|| EditorError::not_found(Entity::Component, id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = items.len();
        self.clipboard.set(items);

        debug!(page_id, count, "Copied components");
        self.events.publish(EditorEvent::ComponentsCopied {
            page_id: page_id.to_string(),
            component_ids: component_ids.to_vec(),
        });
        Ok(count)
    }

    /// Paste the clipboard onto the root layout as one undoable action
    ///
    /// Item `i` lands at `at + i * offset`. Without a point the first item
    /// lands one offset away from where it was copied. Pasted copies get fresh
    /// ids and sit above everything already on the page.
    pub fn paste_components(&mut self, page_id: &str, at: Option<Point>) -> Result<Vec<ComponentInstance>, EditorError> {
        self.page(page_id)?;
        let items = self.clipboard.contents();
        let Some(first) = items.first() else {
            return Ok(Vec::new());
        };

        let offset = self.config.clipboard.paste_offset;
        let origin = at.unwrap_or_else(|| Point::new(first.position.x, first.position.y).offset(offset, offset));

        let mut pasted = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            if self.registry.component(&item.component_id).is_none() {
                return Err(EditorError::not_found(Entity::Kind, item.component_id));
            }
            let step = offset * i as f64;
            let mut instance = item;
            instance.id = self.ids.new_id();
            instance.position.x = origin.x + step;
            instance.position.y = origin.y + step;
            instance.children = instance.children.map(|_| Vec::new());
            instance.locked = false;
            instance.grouped = None;
            pasted.push(instance);
        }

        let page = self.page(page_id)?;
        let base_z = page.next_z_index();
        let base_slot = page.layout.children.len();
        let base_index = page.components.len();
        let changes: Vec<Change> = pasted
            .iter_mut()
            .enumerate()
            .map(|(i, instance)| {
                instance.position.z_index = base_z + i as i64;
                Change::Insert(Subtree {
                    parent: ParentRef::Layout,
                    index: base_slot + i,
                    root: instance.id.clone(),
                    nodes: vec![(base_index + i, instance.clone())],
                })
            })
            .collect();

        let component_ids: Vec<String> = pasted.iter().map(|c| c.id.clone()).collect();
        self.commit(page_id, ActionType::PasteComponents, page_id, changes)?;

        info!(page_id, count = pasted.len(), "Pasted components");
        self.events.publish(EditorEvent::ComponentsPasted {
            page_id: page_id.to_string(),
            component_ids,
        });
        Ok(pasted)
    }

    // ---------------------------------------------------------------
    // History
    // ---------------------------------------------------------------

    /// Revert the most recent action; `false` when there is nothing to undo
    pub fn undo(&mut self, page_id: &str) -> Result<bool, EditorError> {
        let Some(action) = self.document_mut(page_id)?.undo(Utc::now())? else {
            return Ok(false);
        };

        debug!(page_id, action_id = action.id(), "Undid action");
        self.events.publish(EditorEvent::ActionUndone {
            page_id: page_id.to_string(),
            action_id: action.id().to_string(),
            action_type: action.action_type,
        });
        Ok(true)
    }

    /// Reapply the next undone action; `false` when already at the tail
    pub fn redo(&mut self, page_id: &str) -> Result<bool, EditorError> {
        let Some(action) = self.document_mut(page_id)?.redo(Utc::now())? else {
            return Ok(false);
        };

        debug!(page_id, action_id = action.id(), "Redid action");
        self.events.publish(EditorEvent::ActionRedone {
            page_id: page_id.to_string(),
            action_id: action.id().to_string(),
            action_type: action.action_type,
        });
        Ok(true)
    }

    pub fn can_undo(&self, page_id: &str) -> Result<bool, EditorError> {
        Ok(self.document(page_id)?.history().can_undo())
    }

    pub fn can_redo(&self, page_id: &str) -> Result<bool, EditorError> {
        Ok(self.document(page_id)?.history().can_redo())
    }

    pub fn page_history(&self, page_id: &str) -> Result<&[Action], EditorError> {
        Ok(self.document(page_id)?.history().actions())
    }

    // ---------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------

    pub fn create_snapshot(&mut self, page_id: &str, name: &str) -> Result<Snapshot, EditorError> {
        self.snapshot_at(page_id, name, false, Utc::now())
    }

    /// Replace the live page content with a snapshot's copy
    ///
    /// Recorded as one history entry, so the restore can itself be undone.
    /// The page keeps its id, slug, version and publish state.
    #[instrument(skip(self))]
    pub fn restore_snapshot(&mut self, page_id: &str, snapshot_id: &str) -> Result<(), EditorError> {
        let document = self.document(page_id)?;
        let snapshot = document
            .snapshots()
            .get(snapshot_id)
            .ok_or_else(|| EditorError::not_found(Entity::Snapshot, snapshot_id))?;

        let change = Change::ReplacePage {
            before: Box::new(document.page().clone()),
            after: Box::new(snapshot.data.clone()),
        };
        self.commit(page_id, ActionType::RestoreSnapshot, snapshot_id, vec![change])?;

        info!(page_id, snapshot_id, "Restored snapshot");
        self.events.publish(EditorEvent::SnapshotRestored {
            page_id: page_id.to_string(),
            snapshot_id: snapshot_id.to_string(),
        });
        Ok(())
    }

    /// Snapshots of a page, oldest first
    pub fn page_snapshots(&self, page_id: &str) -> Result<&[Snapshot], EditorError> {
        Ok(self.document(page_id)?.snapshots().list())
    }

    /// Take an automatic snapshot of every open page; returns how many were taken
    ///
    /// A page that fails is logged and skipped.
    #[instrument(skip(self))]
    pub fn autosave(&mut self, now: DateTime<Utc>) -> usize {
        let mut page_ids: Vec<String> = self.documents.keys().cloned().collect();
        page_ids.sort();

        let name = format!("Auto-save {}", now.format("%H:%M:%S"));
        let mut saved = 0;
        for page_id in page_ids {
            match self.snapshot_at(&page_id, &name, true, now) {
                Ok(_) => saved += 1,
                Err(e) => warn!(page_id = %page_id, error = %e, "Autosave failed"),
            }
        }

        debug!(saved, "Autosave pass finished");
        saved
    }

    /// Drive the autosave schedule; returns how many snapshots were taken
    pub fn tick(&mut self, now: DateTime<Utc>) -> usize {
        if self.autosave.poll(now) {
            self.autosave(now)
        } else {
            0
        }
    }

    fn snapshot_at(
        &mut self,
        page_id: &str,
        name: &str,
        is_auto_save: bool,
        now: DateTime<Utc>,
    ) -> Result<Snapshot, EditorError> {
        let snapshot_id = self.ids.new_id();
        let document = self.document_mut(page_id)?;
        let snapshot = Snapshot {
            id: snapshot_id,
            page_id: page_id.to_string(),
            name: name.to_string(),
            data: document.page().clone(),
            created_at: now,
            is_auto_save,
        };
        document.snapshots_mut().insert(snapshot.clone());

        debug!(page_id, snapshot_id = %snapshot.id, is_auto_save, "Created snapshot");
        self.events.publish(EditorEvent::SnapshotCreated {
            page_id: page_id.to_string(),
            snapshot_id: snapshot.id.clone(),
            is_auto_save,
        });
        Ok(snapshot)
    }

    // ---------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------

    /// Render a page; `format` is one of `markup`, `html`, `json`, `alt-framework`
    pub fn export_page(&self, page_id: &str, format: &str) -> Result<String, EditorError> {
        let page = self.page(page_id)?;
        let format: ExportFormat = format.parse()?;
        Ok(export::export_page(page, &self.registry, format)?)
    }

    pub fn export_page_as(&self, page_id: &str, format: ExportFormat) -> Result<String, EditorError> {
        let page = self.page(page_id)?;
        Ok(export::export_page(page, &self.registry, format)?)
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn document_mut(&mut self, page_id: &str) -> Result<&mut Document, EditorError> {
        self.documents
            .get_mut(page_id)
            .ok_or_else(|| EditorError::not_found(Entity::Page, page_id))
    }

    fn component(&self, page_id: &str, component_id: &str) -> Result<&ComponentInstance, EditorError> {
        self.page(page_id)?
            .component(component_id)
            .ok_or_else(|| EditorError::not_found(Entity::Component, component_id))
    }

    fn nestable_parent(&self, page: &Page, parent_id: Option<&str>) -> Result<ParentRef, EditorError> {
        let Some(parent_id) = parent_id else {
            return Ok(ParentRef::Layout);
        };
        let parent = page
            .component(parent_id)
            .ok_or_else(|| EditorError::not_found(Entity::Component, parent_id))?;
        if !parent.is_nestable() {
            return Err(MutationError::NotNestable(parent_id.to_string()).into());
        }
        Ok(ParentRef::Component(parent_id.to_string()))
    }

    fn commit(
        &mut self,
        page_id: &str,
        action_type: ActionType,
        target: &str,
        changes: Vec<Change>,
    ) -> Result<(), EditorError> {
        let now = Utc::now();
        let action = Action::new(action_type, target, changes, self.ids.new_id(), now);
        self.document_mut(page_id)?.commit(action, now)?;

        debug!(page_id, action = ?action_type, target, "Committed action");
        Ok(())
    }

    /// Fresh component ids, no dangling children, version 1, unpublished
    fn reset_copy(&mut self, page: &mut Page, now: DateTime<Utc>) {
        let ids = &mut self.ids;
        page.remap_component_ids(|| ids.new_id());

        let pruned = page.prune_dangling();
        if pruned > 0 {
            warn!(page_id = %page.id, pruned, "Dropped child ids that do not resolve");
        }

        page.version = 1;
        page.created_at = now;
        page.updated_at = now;
        page.is_published = false;
        page.published_at = None;
    }

    fn unique_slug_for(&self, requested: &str) -> String {
        let mut base = slugify(requested);
        if base.is_empty() {
            base = "page".to_string();
        }
        unique_slug(&base, |candidate| {
            self.documents.values().any(|doc| doc.page().slug == candidate)
        })
    }

    fn insert_document(&mut self, page: Page) {
        let document = Document::new(page, &self.config);
        self.documents.insert(document.page().id.clone(), document);
    }
}

fn sort_recent_first(pages: &mut [&Page]) {
    pages.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

/// `Group` followed by the last four characters of the group id
fn default_group_name(group_id: &str) -> String {
    let tail = group_id
        .char_indices()
        .rev()
        .nth(3)
        .map_or(group_id, |(at, _)| &group_id[at..]);
    format!("Group {}", tail)
}
