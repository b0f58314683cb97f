//! Long mutation sequences against the history
//!
//! This tests:
//! - Undo n times restores the starting tree, redo n times the final one
//! - A new mutation after undo discards the redo tail
//! - The history bound evicts the oldest actions
//! - Tree integrity after every step

mod common;

use anyhow::Result;
use common::{add, add_under, blank_page, engine, engine_with, structure};
use pagesmith_editor::{ComponentUpdate, Engine, EngineConfig};
use pagesmith_model::{props, PageMetadata};
use serde_json::json;

/// Ten mixed edits over a nested tree; every step must leave the tree intact
fn mixed_sequence(engine: &mut Engine, page_id: &str) -> Result<usize> {
    let mut steps = 0;
    let mut step = |engine: &Engine| -> Result<()> {
        engine.page(page_id)?.check_integrity()?;
        steps += 1;
        Ok(())
    };

    let section = add(engine, page_id, "section", 0.0)?;
    step(engine)?;
    let hero = add(engine, page_id, "hero", 400.0)?;
    step(engine)?;
    let nested = add_under(engine, page_id, "pricing-cards", &section.id)?;
    step(engine)?;

    engine.move_component(page_id, &hero.id, Some(&section.id), 0)?;
    step(engine)?;
    engine.update_component(
        page_id,
        &nested.id,
        ComponentUpdate {
            props: Some(props(json!({ "currency": "EUR" }))),
            ..ComponentUpdate::default()
        },
    )?;
    step(engine)?;

    let group = engine.group_components(page_id, &[hero.id.clone(), nested.id.clone()], None)?;
    step(engine)?;
    engine.bring_to_front(page_id, &section.id)?;
    step(engine)?;
    engine.ungroup_components(page_id, &group)?;
    step(engine)?;

    engine.copy_components(page_id, &[hero.id.clone()])?;
    engine.paste_components(page_id, None)?;
    step(engine)?;
    engine.remove_component(page_id, &section.id)?;
    step(engine)?;

    Ok(steps)
}

#[test]
fn test_undo_redo_inverse_law() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    let start = structure(engine.page(&page_id)?);

    let n = mixed_sequence(&mut engine, &page_id)?;
    assert_eq!(n, 10);
    assert_eq!(engine.page_history(&page_id)?.len(), n);
    let end = structure(engine.page(&page_id)?);

    for _ in 0..n {
        assert!(engine.undo(&page_id)?);
        engine.page(&page_id)?.check_integrity()?;
    }
    assert!(!engine.undo(&page_id)?);
    assert_eq!(structure(engine.page(&page_id)?), start);

    for _ in 0..n {
        assert!(engine.redo(&page_id)?);
        engine.page(&page_id)?.check_integrity()?;
    }
    assert!(!engine.redo(&page_id)?);
    assert_eq!(structure(engine.page(&page_id)?), end);

    Ok(())
}

#[test]
fn test_partial_undo_then_redo() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    mixed_sequence(&mut engine, &page_id)?;

    let mut states = vec![structure(engine.page(&page_id)?)];
    for _ in 0..4 {
        engine.undo(&page_id)?;
        states.push(structure(engine.page(&page_id)?));
    }

    // Walk back up and compare against the states seen on the way down
    for expected in states.iter().rev().skip(1) {
        engine.redo(&page_id)?;
        assert_eq!(&structure(engine.page(&page_id)?), expected);
    }

    Ok(())
}

#[test]
fn test_mutation_after_undo_truncates() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    add(&mut engine, &page_id, "hero", 0.0)?;
    add(&mut engine, &page_id, "pricing-cards", 600.0)?;
    add(&mut engine, &page_id, "contact-form", 1100.0)?;

    engine.undo(&page_id)?;
    engine.undo(&page_id)?;
    assert!(engine.can_redo(&page_id)?);

    add(&mut engine, &page_id, "testimonial-carousel", 600.0)?;
    assert!(!engine.can_redo(&page_id)?);
    assert!(!engine.redo(&page_id)?);

    let history = engine.page_history(&page_id)?;
    assert_eq!(history.len(), 2);

    let kinds: Vec<String> = engine
        .page(&page_id)?
        .components
        .iter()
        .map(|c| c.component_id.clone())
        .collect();
    assert_eq!(kinds, ["hero", "testimonial-carousel"]);

    Ok(())
}

#[test]
fn test_history_limit_evicts_oldest() -> Result<()> {
    let mut config = EngineConfig::default();
    config.history.limit = 3;
    let mut engine = engine_with(config);
    let page_id = blank_page(&mut engine)?;

    for y in 0..5 {
        add(&mut engine, &page_id, "hero", y as f64 * 600.0)?;
    }
    assert_eq!(engine.page_history(&page_id)?.len(), 3);

    let mut undone = 0;
    while engine.undo(&page_id)? {
        undone += 1;
    }
    assert_eq!(undone, 3);

    // The two evicted additions can no longer be undone
    assert_eq!(engine.page(&page_id)?.components.len(), 2);

    Ok(())
}

#[test]
fn test_page_edits_are_undoable() -> Result<()> {
    let mut engine = engine();
    let page_id = blank_page(&mut engine)?;
    let original = engine.page(&page_id)?.metadata.clone();

    let metadata = PageMetadata {
        title: "Spring Offers".to_string(),
        description: "Seasonal deals".to_string(),
        ..original.clone()
    };
    engine.update_page_metadata(&page_id, metadata)?;
    engine.set_page_tags(&page_id, ["seasonal", "offers"])?;

    let page = engine.page(&page_id)?;
    assert_eq!(page.metadata.title, "Spring Offers");
    assert_eq!(page.tags.len(), 2);

    engine.undo(&page_id)?;
    assert!(engine.page(&page_id)?.tags.is_empty());
    engine.undo(&page_id)?;
    assert_eq!(engine.page(&page_id)?.metadata, original);

    Ok(())
}

#[test]
fn test_undo_does_not_touch_other_pages() -> Result<()> {
    let mut engine = engine();
    let first = blank_page(&mut engine)?;
    let second = blank_page(&mut engine)?;

    add(&mut engine, &first, "hero", 0.0)?;
    add(&mut engine, &second, "pricing-cards", 0.0)?;

    assert!(engine.undo(&first)?);
    assert!(engine.page(&first)?.components.is_empty());
    assert_eq!(engine.page(&second)?.components.len(), 1);
    assert!(!engine.can_undo(&first)?);
    assert!(engine.can_undo(&second)?);

    Ok(())
}
