//! Rule dispatch: turns descriptors into wired rule instances

use crate::library;
use crate::types::{Calendar, RuleSpec};
use nest_core::{EntityId, Result};
use nest_world::World;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Wire one rule onto `id` under an explicit label
pub fn apply_rule(
    world: &mut World,
    id: &str,
    spec: &RuleSpec,
    calendar: &Calendar,
    label: &str,
) -> Result<()> {
    debug!(entity = id, label, rule = ?spec, "applying rule");

    match spec {
        RuleSpec::UnitMax { limit } => library::unit_max(world, id, *limit, label),
        RuleSpec::UnitMin { limit } => library::unit_min(world, id, *limit, label),
        RuleSpec::TakenOnce => library::taken_once(world, id, calendar, label),
        RuleSpec::RequireChildren { ids } => {
            library::require_children(world, id, id_set(ids), label)
        }
        RuleSpec::RestrictChildren { ids } => {
            library::restrict_children(world, id, id_set(ids), label)
        }
        RuleSpec::ChildrenMin { count } => library::children_min(world, id, *count, label),
        RuleSpec::RequireScheduled => library::require_scheduled(world, id, calendar, label),
        RuleSpec::SumUnits => library::sum_units(world, id, label),
        RuleSpec::CountOnce => library::count_once(world, id, label),
    }
}

/// Wire rules onto `id` in declaration order.
///
/// Each rule gets its default label; a repeated rule type on the same entity
/// is suffixed (`units-max#2`, ...) so the instances keep separate slots.
/// Returns the labels used.
pub fn apply_rules(
    world: &mut World,
    id: &str,
    rules: &[RuleSpec],
    calendar: &Calendar,
) -> Result<Vec<String>> {
    let mut seen: HashMap<&'static str, usize> = HashMap::new();
    let mut labels = Vec::with_capacity(rules.len());

    for spec in rules {
        let base = spec.label();
        let n = seen.entry(base).or_insert(0);
        *n += 1;
        let label = if *n == 1 {
            base.to_string()
        } else {
            format!("{base}#{n}")
        };

        apply_rule(world, id, spec, calendar, &label)?;
        labels.push(label);
    }
    Ok(labels)
}

fn id_set(ids: &[String]) -> BTreeSet<EntityId> {
    ids.iter().map(|id| EntityId::from(id.as_str())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::active_errors;
    use nest_core::Rect;
    use nest_relation::recompute_all;
    use nest_world::props;

    #[test]
    fn test_repeated_rules_get_distinct_labels() {
        let mut world = World::new();
        world.spawn("q", "quarter").unwrap();
        world.set_number("q", props::TOTAL_UNITS, 30.0).unwrap();

        let labels = apply_rules(
            &mut world,
            "q",
            &[
                RuleSpec::UnitMax { limit: 22.0 },
                RuleSpec::UnitMax { limit: 25.0 },
                RuleSpec::UnitMin { limit: 12.0 },
            ],
            &Calendar::default(),
        )
        .unwrap();

        assert_eq!(labels, vec!["units-max", "units-max#2", "units-min"]);
        assert_eq!(active_errors(&world, "q").unwrap(), vec![">22 units", ">25 units"]);
    }

    #[test]
    fn test_descriptors_drive_library() {
        let mut world = World::new();
        world.spawn("quarter", "quarter").unwrap();
        world.add_region("quarter", Rect::from_edges(0.0, 0.0, 100.0, 100.0).unwrap()).unwrap();
        world.spawn("a", "class").unwrap();
        world.add_region("a", Rect::from_edges(10.0, 10.0, 20.0, 20.0).unwrap()).unwrap();
        world.set_number("a", props::UNITS, 5.0).unwrap();

        apply_rules(
            &mut world,
            "quarter",
            &[RuleSpec::SumUnits, RuleSpec::UnitMax { limit: 4.0 }],
            &Calendar::default(),
        )
        .unwrap();
        recompute_all(&mut world).unwrap();

        assert_eq!(world.number_or("quarter", props::TOTAL_UNITS, 0.0).unwrap(), 5.0);
        assert_eq!(active_errors(&world, "quarter").unwrap(), vec![">4 units"]);
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        let mut world = World::new();
        let result = apply_rule(&mut world, "ghost", &RuleSpec::SumUnits, &Calendar::default(), "sum-units");
        assert!(result.is_err());
    }
}
