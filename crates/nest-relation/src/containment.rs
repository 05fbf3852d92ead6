//! Containment resolver

use nest_core::{EntityId, Result};
use nest_world::{Relation, World};
use std::collections::BTreeMap;

/// Relation counts that differ from what the origin currently stores.
///
/// A zero entry means "no longer related"; relatives whose count did not
/// change are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainmentChange {
    /// Candidates with regions strictly containing an origin region
    pub parents: BTreeMap<EntityId, u32>,
    /// Candidates with regions strictly inside an origin region
    pub children: BTreeMap<EntityId, u32>,
}

impl ContainmentChange {
    pub fn get(&self, relation: Relation) -> &BTreeMap<EntityId, u32> {
        match relation {
            Relation::Parents => &self.parents,
            Relation::Children => &self.children,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty() && self.children.is_empty()
    }
}

/// Recount containment between `id` and every other entity.
///
/// The count for a candidate is the number of (origin region, candidate
/// region) pairs in which one strictly encloses the other, so duplicate
/// placements raise the multiplicity. This is a full scan, quadratic in
/// total region count, and meant to run once per geometry change.
pub fn resolve_containment(world: &World, id: &str) -> Result<ContainmentChange> {
    let origin = world.regions(id)?;
    let mut change = ContainmentChange::default();

    for (other, regions) in world.all_regions() {
        if other.as_str() == id {
            continue;
        }

        let mut as_parent = 0u32;
        let mut as_child = 0u32;
        for mine in origin {
            for theirs in regions {
                if theirs.strictly_contains(mine) {
                    as_parent += 1;
                }
                if mine.strictly_contains(theirs) {
                    as_child += 1;
                }
            }
        }

        if as_parent != world.count(id, Relation::Parents, other)? {
            change.parents.insert(other.clone(), as_parent);
        }
        if as_child != world.count(id, Relation::Children, other)? {
            change.children.insert(other.clone(), as_child);
        }
    }

    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nest_core::Rect;

    fn rect(l: f64, t: f64, r: f64, b: f64) -> Rect {
        Rect::from_edges(l, t, r, b).unwrap()
    }

    fn world() -> World {
        let mut world = World::new();
        world.spawn("quarter", "quarter").unwrap();
        world.spawn("class", "class").unwrap();
        world.spawn("stray", "class").unwrap();
        world.add_region("quarter", rect(0.0, 0.0, 100.0, 100.0)).unwrap();
        world.add_region("class", rect(10.0, 10.0, 20.0, 20.0)).unwrap();
        world.add_region("stray", rect(200.0, 200.0, 210.0, 210.0)).unwrap();
        world
    }

    #[test]
    fn test_detects_both_directions() {
        let world = world();

        let from_class = resolve_containment(&world, "class").unwrap();
        assert_eq!(from_class.parents.get("quarter"), Some(&1));
        assert!(from_class.children.is_empty());

        let from_quarter = resolve_containment(&world, "quarter").unwrap();
        assert_eq!(from_quarter.children.get("class"), Some(&1));
        assert!(from_quarter.parents.is_empty());
    }

    #[test]
    fn test_unrelated_entities_are_omitted() {
        let world = world();
        let change = resolve_containment(&world, "stray").unwrap();
        assert!(change.is_empty());
    }

    #[test]
    fn test_duplicate_placements_count_each_pair() {
        let mut world = world();
        world.add_region("class", rect(30.0, 30.0, 40.0, 40.0)).unwrap();
        world.add_region("class", rect(300.0, 300.0, 310.0, 310.0)).unwrap();
        let change = resolve_containment(&world, "quarter").unwrap();
        assert_eq!(change.children.get("class"), Some(&2));
    }

    #[test]
    fn test_reports_zero_when_stored_relation_disappears() {
        let mut world = world();
        world
            .update_counts("class", Relation::Parents, |m| {
                m.insert(EntityId::from("stray"), 1);
            }, None)
            .unwrap();
        let change = resolve_containment(&world, "class").unwrap();
        assert_eq!(change.parents.get("stray"), Some(&0));
    }

    #[test]
    fn test_matching_stored_counts_yield_nothing() {
        let mut world = world();
        world
            .update_counts("class", Relation::Parents, |m| {
                m.insert(EntityId::from("quarter"), 1);
            }, None)
            .unwrap();
        let change = resolve_containment(&world, "class").unwrap();
        assert!(change.parents.is_empty());
    }
}
