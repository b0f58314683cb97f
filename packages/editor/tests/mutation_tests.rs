//! Component mutations: validation, locking, nesting, grouping, clipboard

mod common;

use anyhow::Result;
use common::{add, add_under, blank_page, engine, engine_with};
use pagesmith_editor::{
    ActionType, AddOptions, Clipboard, ComponentUpdate, DependencyPolicy, EditorError, Engine, EngineConfig, Entity,
    MutationError,
};
use pagesmith_model::{props, Point, Position, StyleRecord};
use pagesmith_registry::{ComponentDefinition, Constraint, Registry};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_add_merges_props_and_styles() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;

    let options = AddOptions {
        props: props(json!({ "columns": 4 })),
        styles: vec![StyleRecord::new("color", "#333")],
        parent_id: None,
    };
    let grid = engine.add_component(&page_id, "services-grid", Point::new(10.0, 20.0), options)?;

    assert_eq!(grid.props["columns"], json!(4));
    assert_eq!(grid.props["showPrices"], json!(true));
    assert_eq!(grid.styles.last().map(|s| s.property.as_str()), Some("color"));
    assert_eq!((grid.position.x, grid.position.y), (10.0, 20.0));
    assert_eq!(grid.position.width, 1200.0);

    Ok(())
}

#[test]
fn test_add_rejects_invalid_props() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;

    let options = AddOptions {
        props: props(json!({ "columns": 12 })),
        ..AddOptions::default()
    };
    let err = engine
        .add_component(&page_id, "services-grid", Point::default(), options)
        .unwrap_err();

    match err {
        EditorError::Validation(e) => {
            assert_eq!(e.field, "columns");
            assert_eq!(e.constraint, Constraint::Max(6.0));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(engine.page(&page_id)?.components.is_empty());

    Ok(())
}

#[test]
fn test_z_index_is_always_above_existing() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;

    let first = add(&mut engine, &page_id, "hero", 0.0)?;
    engine.bring_to_front(&page_id, &first.id)?;
    let update = ComponentUpdate {
        position: Some(Position::new(0.0, 0.0, 100.0, 100.0, 40)),
        ..ComponentUpdate::default()
    };
    engine.update_component(&page_id, &first.id, update)?;

    for kind in ["services-grid", "pricing-cards", "contact-form"] {
        let max = engine
            .page(&page_id)?
            .components
            .iter()
            .map(|c| c.position.z_index)
            .max()
            .unwrap_or(0);
        let added = add(&mut engine, &page_id, kind, 0.0)?;
        assert!(added.position.z_index > max);
    }

    Ok(())
}

#[test]
fn test_bring_to_front_and_send_to_back() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    let a = add(&mut engine, &page_id, "hero", 0.0)?;
    let b = add(&mut engine, &page_id, "pricing-cards", 600.0)?;

    assert_eq!(engine.bring_to_front(&page_id, &a.id)?, 3);
    assert_eq!(engine.send_to_back(&page_id, &a.id)?, 1);
    assert_eq!(engine.send_to_back(&page_id, &b.id)?, 0);

    engine.undo(&page_id)?;
    let page = engine.page(&page_id)?;
    assert_eq!(page.component(&b.id).map(|c| c.position.z_index), Some(2));

    Ok(())
}

#[test]
fn test_update_merges_props() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    let hero = add(&mut engine, &page_id, "hero", 0.0)?;

    let update = ComponentUpdate {
        name: Some("Launch banner".to_string()),
        props: Some(props(json!({ "title": "Launch", "subtitle": "Today" }))),
        ..ComponentUpdate::default()
    };
    let updated = engine.update_component(&page_id, &hero.id, update)?;
    assert_eq!(updated.name, "Launch banner");
    assert_eq!(updated.props["title"], json!("Launch"));

    let update = ComponentUpdate {
        props: Some(props(json!({ "subtitle": "Tomorrow" }))),
        ..ComponentUpdate::default()
    };
    let updated = engine.update_component(&page_id, &hero.id, update)?;
    assert_eq!(updated.props["title"], json!("Launch"));
    assert_eq!(updated.props["subtitle"], json!("Tomorrow"));

    // Styles replace the whole list
    let update = ComponentUpdate {
        styles: Some(vec![StyleRecord::new("color", "#fff")]),
        ..ComponentUpdate::default()
    };
    let updated = engine.update_component(&page_id, &hero.id, update)?;
    assert_eq!(updated.styles, vec![StyleRecord::new("color", "#fff")]);
    assert_eq!(updated.props["subtitle"], json!("Tomorrow"));

    let bad = ComponentUpdate {
        props: Some(props(json!({ "title": 42 }))),
        ..ComponentUpdate::default()
    };
    let err = engine.update_component(&page_id, &hero.id, bad).unwrap_err();
    assert!(matches!(&err, EditorError::Validation(e) if e.field == "title"));
    assert_eq!(
        engine.page(&page_id)?.component(&hero.id).map(|c| c.props["subtitle"].clone()),
        Some(json!("Tomorrow"))
    );

    let err = engine
        .update_component(&page_id, "ghost", ComponentUpdate::default())
        .unwrap_err();
    assert!(matches!(err, EditorError::NotFound { entity: Entity::Component, .. }));

    Ok(())
}

#[test]
fn test_locked_component_keeps_position() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    let hero = add(&mut engine, &page_id, "hero", 0.0)?;
    add(&mut engine, &page_id, "pricing-cards", 600.0)?;

    let lock = ComponentUpdate {
        locked: Some(true),
        ..ComponentUpdate::default()
    };
    engine.update_component(&page_id, &hero.id, lock)?;

    let mut moved = hero.position.clone();
    moved.x = 50.0;
    let nudge = ComponentUpdate {
        position: Some(moved.clone()),
        ..ComponentUpdate::default()
    };
    let err = engine.update_component(&page_id, &hero.id, nudge).unwrap_err();
    assert!(matches!(err, EditorError::Mutation(MutationError::Locked(_))));

    let err = engine.move_component(&page_id, &hero.id, None, 1).unwrap_err();
    assert!(matches!(err, EditorError::Mutation(MutationError::Locked(_))));
    assert!(engine.bring_to_front(&page_id, &hero.id).is_err());

    // Other fields stay editable
    let rename = ComponentUpdate {
        name: Some("Pinned hero".to_string()),
        ..ComponentUpdate::default()
    };
    engine.update_component(&page_id, &hero.id, rename)?;

    let unlock_and_move = ComponentUpdate {
        position: Some(moved),
        locked: Some(false),
        ..ComponentUpdate::default()
    };
    let updated = engine.update_component(&page_id, &hero.id, unlock_and_move)?;
    assert_eq!(updated.position.x, 50.0);
    assert!(!updated.locked);

    Ok(())
}

#[test]
fn test_remove_takes_descendants() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    let outer = add(&mut engine, &page_id, "section", 0.0)?;
    let inner = add_under(&mut engine, &page_id, "section", &outer.id)?;
    let leaf = add_under(&mut engine, &page_id, "hero", &inner.id)?;
    let other = add(&mut engine, &page_id, "pricing-cards", 600.0)?;

    engine.remove_component(&page_id, &outer.id)?;
    let page = engine.page(&page_id)?;
    assert_eq!(page.layout.children, vec![other.id.clone()]);
    assert!(page.component(&inner.id).is_none());
    assert!(page.component(&leaf.id).is_none());
    assert!(page.check_integrity().is_ok());

    let err = engine.remove_component(&page_id, &leaf.id).unwrap_err();
    assert!(matches!(err, EditorError::NotFound { entity: Entity::Component, .. }));

    Ok(())
}

#[test]
fn test_move_between_parents() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    let section = add(&mut engine, &page_id, "section", 0.0)?;
    let hero = add(&mut engine, &page_id, "hero", 400.0)?;
    let nested = add_under(&mut engine, &page_id, "section", &section.id)?;

    assert_eq!(engine.move_component(&page_id, &hero.id, Some(&section.id), 0)?, 0);
    let page = engine.page(&page_id)?;
    assert_eq!(page.layout.children, vec![section.id.clone()]);
    assert_eq!(
        page.component(&section.id).map(|c| c.child_ids().to_vec()),
        Some(vec![hero.id.clone(), nested.id.clone()])
    );
    assert_eq!(
        engine.page_history(&page_id)?.last().map(|a| a.action_type),
        Some(ActionType::MoveComponent)
    );

    // Into itself or its own subtree
    let err = engine
        .move_component(&page_id, &section.id, Some(&nested.id), 0)
        .unwrap_err();
    assert!(matches!(err, EditorError::Mutation(MutationError::CycleDetected)));
    let err = engine
        .move_component(&page_id, &section.id, Some(&section.id), 0)
        .unwrap_err();
    assert!(matches!(err, EditorError::Mutation(MutationError::CycleDetected)));

    // Into a leaf or a missing parent
    let err = engine
        .move_component(&page_id, &nested.id, Some(&hero.id), 0)
        .unwrap_err();
    assert!(matches!(err, EditorError::Mutation(MutationError::NotNestable(_))));
    let err = engine.move_component(&page_id, &nested.id, Some("ghost"), 0).unwrap_err();
    assert!(matches!(err, EditorError::Mutation(MutationError::ParentNotFound(_))));

    engine.undo(&page_id)?;
    assert_eq!(
        engine.page(&page_id)?.layout.children,
        vec![section.id.clone(), hero.id.clone()]
    );

    Ok(())
}

#[test]
fn test_group_and_ungroup() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    let a = add(&mut engine, &page_id, "hero", 0.0)?;
    let b = add(&mut engine, &page_id, "pricing-cards", 600.0)?;

    let group_id = engine.group_components(&page_id, &[a.id.clone(), b.id.clone()], Some("Above the fold"))?;
    let page = engine.page(&page_id)?;
    assert_eq!(page.group_members(&group_id), vec![a.id.clone(), b.id.clone()]);
    assert_eq!(page.groups.get(&group_id).map(String::as_str), Some("Above the fold"));

    let members = engine.ungroup_components(&page_id, &group_id)?;
    assert_eq!(members.len(), 2);
    let page = engine.page(&page_id)?;
    assert!(page.components.iter().all(|c| c.grouped.is_none()));
    assert!(page.groups.is_empty());

    let err = engine.ungroup_components(&page_id, &group_id).unwrap_err();
    assert!(matches!(err, EditorError::NotFound { entity: Entity::Group, .. }));

    // Undo the ungroup: membership and name come back together
    engine.undo(&page_id)?;
    let page = engine.page(&page_id)?;
    assert_eq!(page.group_members(&group_id).len(), 2);
    assert!(page.groups.contains_key(&group_id));

    let unnamed = engine.group_components(&page_id, &[a.id.clone(), b.id.clone()], None)?;
    let name = engine.page(&page_id)?.groups.get(&unnamed).cloned().unwrap_or_default();
    assert!(name.starts_with("Group "));

    let err = engine
        .group_components(&page_id, &[a.id.clone(), "ghost".to_string()], None)
        .unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}

#[test]
fn test_paste_cascades_and_is_one_action() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    let a = add(&mut engine, &page_id, "hero", 0.0)?;
    let b = add(&mut engine, &page_id, "pricing-cards", 600.0)?;

    assert_eq!(engine.copy_components(&page_id, &[a.id.clone(), b.id.clone()])?, 2);
    let history_before = engine.page_history(&page_id)?.len();

    let pasted = engine.paste_components(&page_id, Some(Point::new(100.0, 100.0)))?;
    assert_eq!(pasted.len(), 2);
    assert_eq!((pasted[0].position.x, pasted[0].position.y), (100.0, 100.0));
    assert_eq!((pasted[1].position.x, pasted[1].position.y), (120.0, 120.0));
    assert_eq!(pasted[0].position.z_index, 3);
    assert_eq!(pasted[1].position.z_index, 4);
    assert!(pasted.iter().all(|c| c.id != a.id && c.id != b.id));
    assert_eq!(pasted[0].props, a.props);

    let page = engine.page(&page_id)?;
    assert_eq!(page.components.len(), 4);
    assert!(page.check_integrity().is_ok());
    assert_eq!(engine.page_history(&page_id)?.len(), history_before + 1);

    engine.undo(&page_id)?;
    assert_eq!(engine.page(&page_id)?.components.len(), 2);

    // Without a point the copies sit one step away from the originals
    let pasted = engine.paste_components(&page_id, None)?;
    assert_eq!((pasted[0].position.x, pasted[0].position.y), (20.0, 20.0));
    assert_eq!((pasted[1].position.x, pasted[1].position.y), (40.0, 40.0));

    Ok(())
}

#[test]
fn test_paste_clears_nesting_lock_and_group() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    let section = add(&mut engine, &page_id, "section", 0.0)?;
    add_under(&mut engine, &page_id, "hero", &section.id)?;
    let lock = ComponentUpdate {
        locked: Some(true),
        ..ComponentUpdate::default()
    };
    engine.update_component(&page_id, &section.id, lock)?;

    engine.copy_components(&page_id, &[section.id.clone()])?;
    let pasted = engine.paste_components(&page_id, None)?;

    assert_eq!(pasted[0].children, Some(Vec::new()));
    assert!(!pasted[0].locked);
    assert!(engine.page(&page_id)?.check_integrity().is_ok());

    Ok(())
}

#[test]
fn test_clipboard_is_shared_across_pages_and_engines() -> Result<()> {
    let clipboard = Clipboard::new();
    let mut first = engine().with_clipboard(clipboard.clone());
    let mut second = engine_with(EngineConfig::default()).with_clipboard(clipboard.clone());

    let source = blank_page(&mut first)?;
    let target = blank_page(&mut second)?;
    let hero = add(&mut first, &source, "hero", 0.0)?;

    first.copy_components(&source, &[hero.id.clone()])?;
    let pasted = second.paste_components(&target, None)?;
    assert_eq!(pasted.len(), 1);
    assert_eq!(pasted[0].component_id, "hero");

    // Empty clipboard: nothing pasted, nothing recorded
    clipboard.clear();
    let before = second.page_history(&target)?.len();
    assert!(second.paste_components(&target, None)?.is_empty());
    assert_eq!(second.page_history(&target)?.len(), before);

    let err = first.copy_components(&source, &["ghost".to_string()]).unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}

#[test]
fn test_dependency_policy() -> Result<()> {
    let mut registry = Registry::builtin();
    let mut checkout = ComponentDefinition::new("checkout", "Checkout", "commerce");
    checkout.dependencies = vec!["pricing-cards".to_string()];
    registry.register_component(checkout);
    let registry = Arc::new(registry);

    let mut warn = Engine::new(registry.clone(), EngineConfig::default());
    let page_id = blank_page(&mut warn)?;
    assert!(warn
        .add_component(&page_id, "checkout", Point::default(), AddOptions::default())
        .is_ok());

    let config = EngineConfig {
        dependency_policy: DependencyPolicy::Reject,
        ..EngineConfig::default()
    };
    let mut strict = Engine::new(registry, config);
    let page_id = blank_page(&mut strict)?;

    let err = strict
        .add_component(&page_id, "checkout", Point::default(), AddOptions::default())
        .unwrap_err();
    match err {
        EditorError::Dependency { kind, missing } => {
            assert_eq!(kind, "checkout");
            assert_eq!(missing, vec!["pricing-cards"]);
        }
        other => panic!("expected dependency error, got {other:?}"),
    }

    add(&mut strict, &page_id, "pricing-cards", 0.0)?;
    assert!(strict
        .add_component(&page_id, "checkout", Point::default(), AddOptions::default())
        .is_ok());

    Ok(())
}
