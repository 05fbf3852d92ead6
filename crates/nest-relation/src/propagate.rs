//! Delta propagator: commits relation counts symmetrically

use crate::containment::{resolve_containment, ContainmentChange};
use nest_core::{EntityId, Rect, Result};
use nest_world::{CountChange, Delta, Relation, World};
use std::collections::BTreeMap;
use tracing::debug;

/// Apply new counts for `relation` of `id`, mirroring each one onto the
/// relative.
///
/// For every relative whose stored count differs, the origin side is written
/// first and then the mirrored side, each through [`World::set`] with a
/// delta carrying the same transition. A count of zero removes the entry on
/// both sides. A listener error on either side is returned only after both
/// sides hold the new count.
pub fn propagate(
    world: &mut World,
    id: &str,
    relation: Relation,
    changes: &BTreeMap<EntityId, u32>,
) -> Result<()> {
    let origin = EntityId::from(id);

    for (relative, &current) in changes {
        // A cascade triggered by an earlier relative may already have
        // written this one.
        let previous = world.count(id, relation, relative)?;
        if previous == current {
            continue;
        }
        let change = CountChange::new(previous, current);

        debug!(
            origin = id,
            relation = relation.property(),
            relative = %relative,
            previous,
            current,
            "relation changed"
        );

        let delta = Delta::single(relative.clone(), change);
        let written =
            world.update_counts(id, relation, |m| write_count(m, relative, current), Some(&delta));

        // The mirror is written even when an origin listener failed
        let mirrored = Delta::single(origin.clone(), change);
        let mirror_written = world.update_counts(
            relative,
            relation.mirror(),
            |m| write_count(m, &origin, current),
            Some(&mirrored),
        );
        written.and(mirror_written)?;
    }

    Ok(())
}

fn write_count(map: &mut BTreeMap<EntityId, u32>, key: &EntityId, count: u32) {
    if count == 0 {
        map.remove(key);
    } else {
        map.insert(key.clone(), count);
    }
}

/// Resolve containment for one entity and propagate both relations
pub fn recompute(world: &mut World, id: &str) -> Result<ContainmentChange> {
    let change = resolve_containment(world, id)?;
    propagate(world, id, Relation::Parents, &change.parents)?;
    propagate(world, id, Relation::Children, &change.children)?;
    Ok(change)
}

/// Settle every entity, in id order
pub fn recompute_all(world: &mut World) -> Result<()> {
    for id in world.ids() {
        recompute(world, &id)?;
    }
    Ok(())
}

/// Move one region and recompute the owner's relations
pub fn move_region(
    world: &mut World,
    id: &str,
    index: usize,
    rect: Rect,
) -> Result<ContainmentChange> {
    world.set_region(id, index, rect)?;
    recompute(world, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nest_core::NestError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn rect(l: f64, t: f64, r: f64, b: f64) -> Rect {
        Rect::from_edges(l, t, r, b).unwrap()
    }

    /// Three nested boxes plus one loose box
    fn world() -> World {
        let mut world = World::new();
        for (id, kind, r) in [
            ("track", "track", rect(0.0, 0.0, 1000.0, 1000.0)),
            ("quarter", "quarter", rect(10.0, 10.0, 500.0, 500.0)),
            ("class", "class", rect(20.0, 20.0, 40.0, 40.0)),
            ("loose", "class", rect(2000.0, 0.0, 2010.0, 10.0)),
        ] {
            world.spawn(id, kind).unwrap();
            world.add_region(id, r).unwrap();
        }
        world
    }

    fn assert_symmetric(world: &World) {
        for a in world.ids() {
            for b in world.ids() {
                assert_eq!(
                    world.count(&a, Relation::Children, &b).unwrap(),
                    world.count(&b, Relation::Parents, &a).unwrap(),
                    "{a} -> {b} not mirrored"
                );
            }
            for (_, &n) in world.counts(&a, Relation::Children).unwrap().iter() {
                assert!(n > 0);
            }
        }
    }

    #[test]
    fn test_recompute_all_settles_symmetrically() {
        let mut world = world();
        recompute_all(&mut world).unwrap();

        assert_eq!(world.count("track", Relation::Children, "quarter").unwrap(), 1);
        assert_eq!(world.count("track", Relation::Children, "class").unwrap(), 1);
        assert_eq!(world.count("class", Relation::Parents, "quarter").unwrap(), 1);
        assert_eq!(world.count("loose", Relation::Parents, "track").unwrap(), 0);
        assert_symmetric(&world);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut world = world();
        recompute_all(&mut world).unwrap();
        for id in world.ids() {
            assert!(recompute(&mut world, &id).unwrap().is_empty());
            assert!(recompute(&mut world, &id).unwrap().is_empty());
        }
    }

    #[test]
    fn test_moving_out_removes_both_sides() {
        let mut world = world();
        recompute_all(&mut world).unwrap();

        let change = move_region(&mut world, "class", 0, rect(600.0, 600.0, 620.0, 620.0)).unwrap();
        assert_eq!(change.parents.get("quarter"), Some(&0));
        assert!(!world.counts("quarter", Relation::Children).unwrap().contains_key("class"));
        assert!(!world.counts("class", Relation::Parents).unwrap().contains_key("quarter"));
        assert_eq!(world.count("class", Relation::Parents, "track").unwrap(), 1);
        assert_symmetric(&world);
    }

    #[test]
    fn test_both_sides_receive_the_same_transition() {
        let mut world = world();
        let seen: Rc<RefCell<Vec<(String, i64)>>> = Rc::new(RefCell::new(Vec::new()));

        for (id, prop) in [("quarter", "children"), ("class", "parents")] {
            let seen = seen.clone();
            world
                .subscribe(id, prop, "spy", move |_, delta| {
                    if let Some(delta) = delta {
                        for (relative, change) in delta.iter() {
                            seen.borrow_mut().push((relative.to_string(), change.delta()));
                        }
                    }
                    Ok(())
                })
                .unwrap();
        }

        recompute(&mut world, "class").unwrap();
        let seen = seen.borrow();
        assert!(seen.contains(&("class".to_string(), 1)));
        assert!(seen.contains(&("quarter".to_string(), 1)));
    }

    #[test]
    fn test_duplicate_placement_raises_multiplicity() {
        let mut world = world();
        recompute_all(&mut world).unwrap();
        world.add_region("class", rect(50.0, 50.0, 60.0, 60.0)).unwrap();
        recompute(&mut world, "class").unwrap();
        assert_eq!(world.count("quarter", Relation::Children, "class").unwrap(), 2);
        assert_symmetric(&world);
    }

    #[test]
    fn test_listener_failure_keeps_both_sides_written() {
        let mut world = world();
        world
            .subscribe("class", "parents", "fail", |_, _| {
                Err(NestError::LayoutError("listener failed".to_string()))
            })
            .unwrap();

        assert!(matches!(recompute(&mut world, "class"), Err(NestError::LayoutError(_))));
        assert_eq!(world.count("class", Relation::Parents, "quarter").unwrap(), 1);
        assert_eq!(world.count("quarter", Relation::Children, "class").unwrap(), 1);
        assert_symmetric(&world);
    }

    #[test]
    fn test_random_moves_stay_symmetric_and_settled() {
        let mut world = world();
        recompute_all(&mut world).unwrap();
        let ids = world.ids();

        let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut next = move |bound: u64| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed % bound
        };

        for _ in 0..200 {
            let id = &ids[next(ids.len() as u64) as usize];
            let l = next(900) as f64;
            let t = next(900) as f64;
            let w = 1.0 + next(600) as f64;
            let h = 1.0 + next(600) as f64;
            move_region(&mut world, id, 0, rect(l, t, l + w, t + h)).unwrap();

            assert_symmetric(&world);
            for other in &ids {
                assert!(recompute(&mut world, other).unwrap().is_empty(), "{other} not settled");
            }
        }
    }
}
