//! Building a settled world from a catalog and a saved layout

use crate::catalog::Catalog;
use crate::snapshot::LayoutSnapshot;
use nest_core::{Rect, Result};
use nest_relation::recompute_all;
use nest_rules::apply_rules;
use nest_world::{props, World};
use tracing::{debug, info, warn};

/// Regions for one entity: saved rectangles replace the declared defaults
/// position by position, extra saved rectangles are appended, and
/// defaults past the end of the saved list are kept.
pub fn seed_regions(defaults: &[Rect], saved: Option<&[Rect]>) -> Vec<Rect> {
    let saved = saved.unwrap_or(&[]);
    let mut regions: Vec<Rect> = saved.to_vec();
    if defaults.len() > saved.len() {
        regions.extend_from_slice(&defaults[saved.len()..]);
    }
    regions
}

/// Spawn every declared entity, seed its units and regions, wire its rules
/// in declaration order, then settle containment.
pub fn build_world(catalog: &Catalog, snapshot: &LayoutSnapshot) -> Result<World> {
    let mut world = World::new();

    for (id, def) in &catalog.entities {
        world.spawn(id.as_str(), def.kind.as_str())?;
        if let Some(units) = def.units {
            world.set_number(id, props::UNITS, units)?;
        }
        for rect in seed_regions(&def.regions, snapshot.get(id)) {
            world.add_region(id, rect)?;
        }
    }

    for id in snapshot.regions.keys() {
        if !catalog.entities.contains_key(id) {
            warn!(entity = %id, "saved layout names an undeclared entity, ignoring");
        }
    }

    for (id, def) in &catalog.entities {
        let labels = apply_rules(&mut world, id, &def.rules, &catalog.calendar)?;
        if !labels.is_empty() {
            debug!(entity = %id, rules = ?labels, "rules wired");
        }
    }

    recompute_all(&mut world)?;
    info!(entities = world.entity_count(), "world settled");
    Ok(world)
}
