//! Layout check command

use super::{load_catalog, open_world};
use anyhow::Result;
use nest_layout::FileStore;
use nest_rules::{attach_display, SharedSurface, TextSurface, ValidationReport};
use nest_core::EntityId;
use nest_world::World;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub struct CheckArgs {
    pub catalog: String,
    pub layout: Option<String>,
    pub format: String,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let store = args.layout.as_deref().map(FileStore::new);
    let mut world = open_world(&catalog, store.as_ref())?;

    let surfaces = attach_surfaces(&mut world)?;
    let report = ValidationReport::collect(&world)?;

    if args.format == "json" {
        print_json(&world, &surfaces, &report)?;
    } else {
        print_text(&surfaces, &report);
    }

    if !report.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

type Surfaces = BTreeMap<EntityId, Rc<RefCell<TextSurface>>>;

/// One text surface per entity, kept current by the display consumer
fn attach_surfaces(world: &mut World) -> Result<Surfaces> {
    let mut surfaces = Surfaces::new();
    for id in world.ids() {
        let surface = Rc::new(RefCell::new(TextSurface::default()));
        let shared: SharedSurface = surface.clone();
        attach_display(world, &id, vec![shared])?;
        surfaces.insert(id, surface);
    }
    Ok(surfaces)
}

fn print_text(surfaces: &Surfaces, report: &ValidationReport) {
    for surface in surfaces.values() {
        let surface = surface.borrow();
        let marker = if surface.color.is_some() { "!" } else { " " };
        let mut lines = surface.text.lines();
        if let Some(first) = lines.next() {
            println!("{} {}", marker, first);
        }
        for line in lines {
            println!("    {}", line);
        }
    }

    println!();
    if report.is_valid() {
        println!("All rules passed.");
    } else {
        println!("{}", report.summary());
    }
}

fn print_json(world: &World, surfaces: &Surfaces, report: &ValidationReport) -> Result<()> {
    let mut entities = Vec::new();
    for info in world.all_entities() {
        let mut entry = serde_json::to_value(&info)?;
        if let (Some(fields), Some(surface)) = (entry.as_object_mut(), surfaces.get(&info.id)) {
            let surface = surface.borrow();
            fields.insert("text".to_string(), surface.text.clone().into());
            fields.insert("color".to_string(), serde_json::json!(surface.color.map(|c| c.to_css())));
        }
        entities.push(entry);
    }

    let output = serde_json::json!({
        "valid": report.is_valid(),
        "summary": report.summary(),
        "errors": report.error_count(),
        "report": report,
        "entities": entities,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
