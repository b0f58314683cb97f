//! Shared helpers for the editor integration tests

#![allow(dead_code)]

use anyhow::Result;
use pagesmith_common::IdGenerator;
use pagesmith_editor::{AddOptions, Engine, EngineConfig, PageOptions};
use pagesmith_model::{ComponentInstance, Page, Point};
use pagesmith_registry::Registry;
use std::sync::Arc;

pub fn engine() -> Engine {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> Engine {
    Engine::new(Arc::new(Registry::builtin()), config).with_id_generator(IdGenerator::from_seed("it"))
}

pub fn blank_page(engine: &mut Engine) -> Result<String> {
    Ok(engine.create_page(None, PageOptions::default())?.id.clone())
}

pub fn add(engine: &mut Engine, page_id: &str, kind: &str, y: f64) -> Result<ComponentInstance> {
    Ok(engine.add_component(page_id, kind, Point::new(0.0, y), AddOptions::default())?)
}

pub fn add_under(engine: &mut Engine, page_id: &str, kind: &str, parent_id: &str) -> Result<ComponentInstance> {
    let options = AddOptions {
        parent_id: Some(parent_id.to_string()),
        ..AddOptions::default()
    };
    Ok(engine.add_component(page_id, kind, Point::default(), options)?)
}

/// Tree and component table, the parts undo must restore exactly
pub fn structure(page: &Page) -> (Vec<String>, Vec<ComponentInstance>) {
    (page.layout.children.clone(), page.components.clone())
}
