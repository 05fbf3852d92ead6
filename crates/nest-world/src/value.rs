//! Property values and change deltas

use nest_core::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Well-known property names
pub mod props {
    pub const PARENTS: &str = "parents";
    pub const CHILDREN: &str = "children";
    pub const UNITS: &str = "units";
    pub const TOTAL_UNITS: &str = "total-units";
    pub const ERRORS: &str = "errors";
    pub const COUNTED_BY: &str = "counted-by";
}

/// A property value.
///
/// Properties are untyped at the store level; each well-known property
/// always holds the same variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    /// Relative id -> positive multiplicity (`parents`, `children`)
    Counts(BTreeMap<EntityId, u32>),
    /// Label -> message (`errors`)
    Messages(BTreeMap<String, String>),
    /// A set of entity ids (`counted-by`)
    Ids(BTreeSet<EntityId>),
}

impl Value {
    pub fn empty_counts() -> Self {
        Value::Counts(BTreeMap::new())
    }

    pub fn empty_messages() -> Self {
        Value::Messages(BTreeMap::new())
    }

    pub fn empty_ids() -> Self {
        Value::Ids(BTreeSet::new())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_counts(&self) -> Option<&BTreeMap<EntityId, u32>> {
        match self {
            Value::Counts(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_counts_mut(&mut self) -> Option<&mut BTreeMap<EntityId, u32>> {
        match self {
            Value::Counts(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_messages(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Value::Messages(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_messages_mut(&mut self) -> Option<&mut BTreeMap<String, String>> {
        match self {
            Value::Messages(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&BTreeSet<EntityId>> {
        match self {
            Value::Ids(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ids_mut(&mut self) -> Option<&mut BTreeSet<EntityId>> {
        match self {
            Value::Ids(s) => Some(s),
            _ => None,
        }
    }
}

/// One of the two mirrored relation properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Parents,
    Children,
}

impl Relation {
    pub fn property(self) -> &'static str {
        match self {
            Relation::Parents => props::PARENTS,
            Relation::Children => props::CHILDREN,
        }
    }

    /// The relation stored on the other side: `A.children[B]` mirrors `B.parents[A]`
    pub fn mirror(self) -> Self {
        match self {
            Relation::Parents => Relation::Children,
            Relation::Children => Relation::Parents,
        }
    }
}

/// Multiplicity transition of one relative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountChange {
    pub previous: u32,
    pub current: u32,
}

impl CountChange {
    pub fn new(previous: u32, current: u32) -> Self {
        Self { previous, current }
    }

    pub fn delta(&self) -> i64 {
        i64::from(self.current) - i64::from(self.previous)
    }

    /// 0 -> positive, regardless of jump size
    pub fn entered(&self) -> bool {
        self.previous == 0 && self.current > 0
    }

    pub fn exited(&self) -> bool {
        self.previous > 0 && self.current == 0
    }
}

/// Payload handed to relation listeners: relative id -> count transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    changes: BTreeMap<EntityId, CountChange>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(relative: EntityId, change: CountChange) -> Self {
        let mut delta = Self::new();
        delta.insert(relative, change);
        delta
    }

    pub fn insert(&mut self, relative: EntityId, change: CountChange) {
        self.changes.insert(relative, change);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &CountChange)> {
        self.changes.iter()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
