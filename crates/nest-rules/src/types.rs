//! Rule descriptors and the scheduling calendar

use serde::{Deserialize, Serialize};

/// A declarative rule attached to one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleSpec {
    /// `total-units` must not exceed `limit`
    UnitMax { limit: f64 },
    /// `total-units` must reach at least `limit`
    UnitMin { limit: f64 },
    /// At most one quarter (or the transfer entity) may hold this entity
    TakenOnce,
    /// Every listed id must be a child
    RequireChildren { ids: Vec<String> },
    /// Only listed ids may be children
    RestrictChildren { ids: Vec<String> },
    /// At least `count` children of any kind
    ChildrenMin { count: usize },
    /// Every class child must sit in a known term or in transfer
    RequireScheduled,
    /// Keep `total-units` equal to the sum of children's `units`
    SumUnits,
    /// Children counted here must not be counted by another entity
    CountOnce,
}

impl RuleSpec {
    /// Default label for the rule's error slot and subscriptions
    pub fn label(&self) -> &'static str {
        match self {
            RuleSpec::UnitMax { .. } => "units-max",
            RuleSpec::UnitMin { .. } => "units-min",
            RuleSpec::TakenOnce => "already-taken",
            RuleSpec::RequireChildren { .. } => "missing-children",
            RuleSpec::RestrictChildren { .. } => "restricted-children",
            RuleSpec::ChildrenMin { .. } => "children-min",
            RuleSpec::RequireScheduled => "unscheduled",
            RuleSpec::SumUnits => "sum-units",
            RuleSpec::CountOnce => "counted-twice",
        }
    }
}

/// Known terms (`"<quarter> <year>"`) and the transfer pseudo-entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calendar {
    pub quarters: Vec<String>,
    pub years: Vec<String>,
    /// Id of the entity standing for credit earned elsewhere
    pub transfer: String,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            quarters: ["Fall", "Winter", "Spring", "Summer"]
                .into_iter()
                .map(String::from)
                .collect(),
            years: ["2022-23", "2023-24", "2024-25", "2025-26"]
                .into_iter()
                .map(String::from)
                .collect(),
            transfer: "transfer".to_string(),
        }
    }
}

impl Calendar {
    /// Every term id, quarter-major within each year
    pub fn terms(&self) -> Vec<String> {
        self.years
            .iter()
            .flat_map(|year| self.quarters.iter().map(move |q| format!("{q} {year}")))
            .collect()
    }

    pub fn is_term(&self, id: &str) -> bool {
        id.split_once(' ').is_some_and(|(quarter, year)| {
            self.quarters.iter().any(|q| q == quarter) && self.years.iter().any(|y| y == year)
        })
    }

    pub fn is_transfer(&self, id: &str) -> bool {
        id == self.transfer
    }
}
