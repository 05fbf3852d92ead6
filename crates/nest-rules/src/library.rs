//! Rule constructors
//!
//! Each constructor wires one rule instance onto entity `id` under `label`.
//! The label names both the rule's subscriptions and its error slot, so it
//! must be unique per entity.

use crate::errors::assert_error;
use crate::types::Calendar;
use nest_core::{EntityId, Result};
use nest_relation::{subscribe_relation, RelationSubscription};
use nest_world::{props, Relation, Value, World};
use std::collections::{BTreeMap, BTreeSet};

fn join(ids: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    ids.into_iter()
        .map(|id| id.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn units_of(world: &World, id: &str) -> Result<Option<f64>> {
    Ok(world.value(id, props::UNITS)?.and_then(Value::as_number))
}

/// Shared body of the two unit bounds: watch `total-units` directly
fn unit_bound(
    world: &mut World,
    id: &str,
    label: &str,
    violated: impl Fn(f64) -> Option<String> + 'static,
) -> Result<()> {
    let owner = EntityId::from(id);
    let slot = label.to_string();
    let check = move |w: &mut World| -> Result<()> {
        let total = w.number_or(&owner, props::TOTAL_UNITS, 0.0)?;
        assert_error(w, &owner, &slot, violated(total))
    };

    check(world)?;
    world.subscribe(id, props::TOTAL_UNITS, label, move |w, _| check(w))
}

/// Error `>{limit} units` while `total-units` exceeds `limit`
pub fn unit_max(world: &mut World, id: &str, limit: f64, label: &str) -> Result<()> {
    unit_bound(world, id, label, move |total| {
        (total > limit).then(|| format!(">{limit} units"))
    })
}

/// Error `<{limit} units` while `total-units` is below `limit`
pub fn unit_min(world: &mut World, id: &str, limit: f64, label: &str) -> Result<()> {
    unit_bound(world, id, label, move |total| {
        (total < limit).then(|| format!("<{limit} units"))
    })
}

/// Error `{id} already taken` when more than one quarter (or the transfer
/// entity) holds this entity
pub fn taken_once(world: &mut World, id: &str, calendar: &Calendar, label: &str) -> Result<()> {
    let transfer = calendar.transfer.clone();
    let owner = EntityId::from(id);
    let slot = label.to_string();

    subscribe_relation(
        world,
        RelationSubscription::new(
            id,
            Relation::Parents,
            label,
            move |w: &World, parent: &EntityId| {
                Ok((w.kind(parent)? == "quarter" || parent.as_str() == transfer).then_some(()))
            },
            move |w: &mut World, holders: &BTreeMap<EntityId, ()>| {
                let message = (holders.len() > 1).then(|| format!("{owner} already taken"));
                assert_error(w, &owner, &slot, message)
            },
        ),
    )?;
    Ok(())
}

/// Error `Missing (...)` listing required ids that are not children
pub fn require_children(
    world: &mut World,
    id: &str,
    required: BTreeSet<EntityId>,
    label: &str,
) -> Result<()> {
    let owner = EntityId::from(id);
    let slot = label.to_string();
    let wanted = required.clone();

    subscribe_relation(
        world,
        RelationSubscription::new(
            id,
            Relation::Children,
            label,
            move |_: &World, child: &EntityId| Ok(wanted.contains(child).then_some(())),
            move |w: &mut World, present: &BTreeMap<EntityId, ()>| {
                let missing: Vec<&EntityId> = required
                    .iter()
                    .filter(|id| !present.contains_key(*id))
                    .collect();
                let message = (!missing.is_empty()).then(|| format!("Missing ({})", join(missing)));
                assert_error(w, &owner, &slot, message)
            },
        ),
    )?;
    Ok(())
}

/// Error `Not allowed (...)` listing children outside the allowed set
pub fn restrict_children(
    world: &mut World,
    id: &str,
    allowed: BTreeSet<EntityId>,
    label: &str,
) -> Result<()> {
    let owner = EntityId::from(id);
    let slot = label.to_string();

    subscribe_relation(
        world,
        RelationSubscription::new(
            id,
            Relation::Children,
            label,
            move |_: &World, child: &EntityId| Ok((!allowed.contains(child)).then_some(())),
            move |w: &mut World, disallowed: &BTreeMap<EntityId, ()>| {
                let message = (!disallowed.is_empty())
                    .then(|| format!("Not allowed ({})", join(disallowed.keys())));
                assert_error(w, &owner, &slot, message)
            },
        ),
    )?;
    Ok(())
}

/// Error while fewer than `min` children are present
pub fn children_min(world: &mut World, id: &str, min: usize, label: &str) -> Result<()> {
    let owner = EntityId::from(id);
    let slot = label.to_string();

    subscribe_relation(
        world,
        RelationSubscription::new(
            id,
            Relation::Children,
            label,
            |_: &World, _: &EntityId| Ok(Some(())),
            move |w: &mut World, children: &BTreeMap<EntityId, ()>| {
                let message = (children.len() < min)
                    .then(|| format!("Needs at least {min} (has {})", children.len()));
                assert_error(w, &owner, &slot, message)
            },
        ),
    )?;
    Ok(())
}

/// Error `Unscheduled (...)` listing class children that sit in no known
/// term and not in transfer. Tracks each child's `parents`.
pub fn require_scheduled(
    world: &mut World,
    id: &str,
    calendar: &Calendar,
    label: &str,
) -> Result<()> {
    let owner = EntityId::from(id);
    let slot = label.to_string();
    let calendar = calendar.clone();

    subscribe_relation(
        world,
        RelationSubscription::new(
            id,
            Relation::Children,
            label,
            move |w: &World, child: &EntityId| {
                if w.kind(child)? != "class" {
                    return Ok(None);
                }
                let scheduled = w
                    .counts(child, Relation::Parents)?
                    .keys()
                    .any(|p| calendar.is_term(p) || calendar.is_transfer(p));
                Ok((!scheduled).then_some(()))
            },
            move |w: &mut World, unscheduled: &BTreeMap<EntityId, ()>| {
                let message = (!unscheduled.is_empty())
                    .then(|| format!("Unscheduled ({})", join(unscheduled.keys())));
                assert_error(w, &owner, &slot, message)
            },
        )
        .with_tracked(props::PARENTS),
    )?;
    Ok(())
}

/// Keep `total-units` equal to the live sum of children's `units`
pub fn sum_units(world: &mut World, id: &str, label: &str) -> Result<()> {
    let owner = EntityId::from(id);

    subscribe_relation(
        world,
        RelationSubscription::new(
            id,
            Relation::Children,
            label,
            |w: &World, child: &EntityId| units_of(w, child),
            move |w: &mut World, units: &BTreeMap<EntityId, f64>| {
                let total: f64 = units.values().sum();
                w.set_number(&owner, props::TOTAL_UNITS, total)
            },
        )
        .with_tracked(props::UNITS),
    )?;
    Ok(())
}

/// Claim every unit-bearing child in its `counted-by` set and raise
/// `Shared with another requirement (...)` when a claimed child is also
/// counted by someone else. A child gaining units later is re-checked.
pub fn count_once(world: &mut World, id: &str, label: &str) -> Result<()> {
    let owner = EntityId::from(id);
    let slot = label.to_string();
    let claimant = owner.clone();
    let releaser = owner.clone();

    subscribe_relation(
        world,
        RelationSubscription::new(
            id,
            Relation::Children,
            label,
            |w: &World, child: &EntityId| {
                if units_of(w, child)?.is_none() {
                    return Ok(None);
                }
                Ok(Some(w.id_set(child, props::COUNTED_BY)?.len()))
            },
            move |w: &mut World, claims: &BTreeMap<EntityId, usize>| {
                let shared: Vec<&EntityId> = claims
                    .iter()
                    .filter(|(_, &n)| n > 1)
                    .map(|(child, _)| child)
                    .collect();
                let message = (!shared.is_empty())
                    .then(|| format!("Shared with another requirement ({})", join(shared)));
                assert_error(w, &owner, &slot, message)
            },
        )
        .with_tracked(props::COUNTED_BY)
        .with_tracked(props::UNITS)
        .with_enter(move |w: &mut World, child: &EntityId| {
            let claimant = claimant.clone();
            w.update_ids(child, props::COUNTED_BY, |ids| {
                ids.insert(claimant);
            })
        })
        .with_exit(move |w: &mut World, child: &EntityId| {
            w.update_ids(child, props::COUNTED_BY, |ids| {
                ids.remove(&releaser);
            })
        }),
    )?;
    Ok(())
}
