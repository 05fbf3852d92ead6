//! World - entity registry with reactive, labeled properties

use crate::entity::EntityInfo;
use crate::value::{Delta, Relation, Value};
use nest_core::{EntityId, NestError, Rect, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;
use tracing::trace;

/// A property listener.
///
/// Listeners receive the world itself so they can read, `set` and
/// (un)subscribe re-entrantly. The delta is whatever the originating `set`
/// passed along; relation writes always pass one, plain writes pass `None`.
pub type Listener = Rc<dyn Fn(&mut World, Option<&Delta>) -> Result<()>>;

#[derive(Default)]
struct Property {
    value: Option<Value>,
    /// Fired in label insertion order. Re-subscribing an existing label
    /// replaces the callback but keeps its position.
    listeners: Vec<(String, Listener)>,
}

struct EntityRecord {
    kind: String,
    regions: Vec<Rect>,
    properties: HashMap<String, Property>,
}

impl EntityRecord {
    fn new(kind: String) -> Self {
        Self {
            kind,
            regions: Vec::new(),
            properties: HashMap::new(),
        }
    }
}

/// The single entity registry.
///
/// All mutation goes through [`World::set`], which runs the full listener
/// fan-out (including nested cascades, depth-first) before returning. There
/// is no interior locking: the world is owned by one caller and handed to
/// listeners as `&mut`.
#[derive(Default)]
pub struct World {
    entities: BTreeMap<EntityId, EntityRecord>,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity with its type tag
    pub fn spawn(&mut self, id: impl Into<EntityId>, kind: impl Into<String>) -> Result<()> {
        let id = id.into();
        if self.entities.contains_key(&id) {
            return Err(NestError::DuplicateEntity(id.to_string()));
        }
        self.entities.insert(id, EntityRecord::new(kind.into()));
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn kind(&self, id: &str) -> Result<&str> {
        Ok(&self.record(id)?.kind)
    }

    /// All entity ids, sorted
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().cloned().collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn info(&self, id: &str) -> Result<EntityInfo> {
        let record = self.record(id)?;
        let mut properties: Vec<String> = record
            .properties
            .iter()
            .filter(|(_, p)| p.value.is_some())
            .map(|(name, _)| name.clone())
            .collect();
        properties.sort();

        Ok(EntityInfo::new(EntityId::from(id), record.kind.clone())
            .with_regions(record.regions.clone())
            .with_properties(properties))
    }

    /// Get info about all entities, in id order
    pub fn all_entities(&self) -> Vec<EntityInfo> {
        self.entities
            .keys()
            .filter_map(|id| self.info(id).ok())
            .collect()
    }

    fn record(&self, id: &str) -> Result<&EntityRecord> {
        self.entities
            .get(id)
            .ok_or_else(|| NestError::EntityNotFound(id.to_string()))
    }

    fn record_mut(&mut self, id: &str) -> Result<&mut EntityRecord> {
        self.entities
            .get_mut(id)
            .ok_or_else(|| NestError::EntityNotFound(id.to_string()))
    }

    // ---- properties ----

    /// The stored value, if anything was ever written
    pub fn value(&self, id: &str, prop: &str) -> Result<Option<&Value>> {
        Ok(self
            .record(id)?
            .properties
            .get(prop)
            .and_then(|p| p.value.as_ref()))
    }

    /// Read a property that must already be initialized.
    ///
    /// Reading an unwritten property without a fallback is a fault
    /// (`PropertyUnset`); use [`World::get_or_else`] when absence is expected.
    pub fn get(&self, id: &str, prop: &str) -> Result<Value> {
        self.value(id, prop)?
            .cloned()
            .ok_or_else(|| NestError::PropertyUnset {
                entity: id.to_string(),
                property: prop.to_string(),
            })
    }

    /// Read a property, producing `default()` when unwritten. The default is
    /// not persisted.
    pub fn get_or_else(
        &self,
        id: &str,
        prop: &str,
        default: impl FnOnce() -> Value,
    ) -> Result<Value> {
        Ok(self.value(id, prop)?.cloned().unwrap_or_else(default))
    }

    /// Write a property and notify its listeners.
    ///
    /// An unwritten property is first materialized with `init()`. `mutate`
    /// then edits the value in place. Every listener subscribed at the time
    /// of the write is invoked in label order, each one running to completion
    /// (including whatever it triggers) before the next. A listener that was
    /// removed or replaced by an earlier sibling is skipped. The first
    /// listener error aborts the fan-out and is returned.
    pub fn set(
        &mut self,
        id: &str,
        prop: &str,
        init: impl FnOnce() -> Value,
        mutate: impl FnOnce(&mut Value),
        delta: Option<&Delta>,
    ) -> Result<()> {
        let listeners = {
            let property = self
                .record_mut(id)?
                .properties
                .entry(prop.to_string())
                .or_default();
            mutate(property.value.get_or_insert_with(init));
            property.listeners.clone()
        };

        trace!(entity = id, property = prop, listeners = listeners.len(), "set");

        for (label, listener) in listeners {
            if !self.is_current(id, prop, &label, &listener) {
                trace!(entity = id, property = prop, label = %label, "skipping detached listener");
                continue;
            }
            listener(self, delta)?;
        }
        Ok(())
    }

    /// Install `listener` under `label`, replacing any previous callback with
    /// the same label (last write wins).
    pub fn subscribe(
        &mut self,
        id: &str,
        prop: &str,
        label: impl Into<String>,
        listener: impl Fn(&mut World, Option<&Delta>) -> Result<()> + 'static,
    ) -> Result<()> {
        let label = label.into();
        let listener: Listener = Rc::new(listener);
        let property = self
            .record_mut(id)?
            .properties
            .entry(prop.to_string())
            .or_default();

        match property.listeners.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = listener,
            None => property.listeners.push((label, listener)),
        }
        Ok(())
    }

    /// Remove the callback under `label`; absent labels are a no-op
    pub fn unsubscribe(&mut self, id: &str, prop: &str, label: &str) -> Result<()> {
        if let Some(property) = self.record_mut(id)?.properties.get_mut(prop) {
            property.listeners.retain(|(l, _)| l != label);
        }
        Ok(())
    }

    /// Labels subscribed to a property, in firing order
    pub fn listener_labels(&self, id: &str, prop: &str) -> Result<Vec<String>> {
        Ok(self
            .record(id)?
            .properties
            .get(prop)
            .map(|p| p.listeners.iter().map(|(l, _)| l.clone()).collect())
            .unwrap_or_default())
    }

    fn is_current(&self, id: &str, prop: &str, label: &str, listener: &Listener) -> bool {
        self.entities
            .get(id)
            .and_then(|r| r.properties.get(prop))
            .and_then(|p| p.listeners.iter().find(|(l, _)| l == label))
            .map(|(_, current)| Rc::ptr_eq(current, listener))
            .unwrap_or(false)
    }

    // ---- typed accessors ----

    pub fn number_or(&self, id: &str, prop: &str, default: f64) -> Result<f64> {
        match self.value(id, prop)? {
            None => Ok(default),
            Some(v) => v.as_number().ok_or_else(|| shape_error(id, prop, "number")),
        }
    }

    /// Current relatives with their multiplicity; empty when never written
    pub fn counts(&self, id: &str, relation: Relation) -> Result<BTreeMap<EntityId, u32>> {
        let prop = relation.property();
        match self.value(id, prop)? {
            None => Ok(BTreeMap::new()),
            Some(v) => v
                .as_counts()
                .cloned()
                .ok_or_else(|| shape_error(id, prop, "count map")),
        }
    }

    /// Stored multiplicity of one relative (0 when absent)
    pub fn count(&self, id: &str, relation: Relation, other: &str) -> Result<u32> {
        let prop = relation.property();
        match self.value(id, prop)? {
            None => Ok(0),
            Some(v) => v
                .as_counts()
                .map(|m| m.get(other).copied().unwrap_or(0))
                .ok_or_else(|| shape_error(id, prop, "count map")),
        }
    }

    pub fn messages(&self, id: &str, prop: &str) -> Result<BTreeMap<String, String>> {
        match self.value(id, prop)? {
            None => Ok(BTreeMap::new()),
            Some(v) => v
                .as_messages()
                .cloned()
                .ok_or_else(|| shape_error(id, prop, "message map")),
        }
    }

    pub fn id_set(&self, id: &str, prop: &str) -> Result<BTreeSet<EntityId>> {
        match self.value(id, prop)? {
            None => Ok(BTreeSet::new()),
            Some(v) => v
                .as_ids()
                .cloned()
                .ok_or_else(|| shape_error(id, prop, "id set")),
        }
    }

    pub fn set_number(&mut self, id: &str, prop: &str, n: f64) -> Result<()> {
        self.check_shape(id, prop, "number", |v| v.as_number().is_some())?;
        self.set(id, prop, || Value::Number(n), |v| *v = Value::Number(n), None)
    }

    pub fn update_counts(
        &mut self,
        id: &str,
        relation: Relation,
        f: impl FnOnce(&mut BTreeMap<EntityId, u32>),
        delta: Option<&Delta>,
    ) -> Result<()> {
        let prop = relation.property();
        self.check_shape(id, prop, "count map", |v| v.as_counts().is_some())?;
        self.set(
            id,
            prop,
            Value::empty_counts,
            |v| {
                if let Some(m) = v.as_counts_mut() {
                    f(m);
                }
            },
            delta,
        )
    }

    pub fn update_messages(
        &mut self,
        id: &str,
        prop: &str,
        f: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<()> {
        self.check_shape(id, prop, "message map", |v| v.as_messages().is_some())?;
        self.set(
            id,
            prop,
            Value::empty_messages,
            |v| {
                if let Some(m) = v.as_messages_mut() {
                    f(m);
                }
            },
            None,
        )
    }

    pub fn update_ids(
        &mut self,
        id: &str,
        prop: &str,
        f: impl FnOnce(&mut BTreeSet<EntityId>),
    ) -> Result<()> {
        self.check_shape(id, prop, "id set", |v| v.as_ids().is_some())?;
        self.set(
            id,
            prop,
            Value::empty_ids,
            |v| {
                if let Some(s) = v.as_ids_mut() {
                    f(s);
                }
            },
            None,
        )
    }

    fn check_shape(
        &self,
        id: &str,
        prop: &str,
        expected: &'static str,
        matches: impl FnOnce(&Value) -> bool,
    ) -> Result<()> {
        match self.value(id, prop)? {
            Some(v) if !matches(v) => Err(shape_error(id, prop, expected)),
            _ => Ok(()),
        }
    }

    // ---- regions ----

    /// Attach another region to an entity, returning its index
    pub fn add_region(&mut self, id: &str, rect: Rect) -> Result<usize> {
        let regions = &mut self.record_mut(id)?.regions;
        regions.push(rect);
        Ok(regions.len() - 1)
    }

    /// Replace one of an entity's regions
    pub fn set_region(&mut self, id: &str, index: usize, rect: Rect) -> Result<()> {
        let regions = &mut self.record_mut(id)?.regions;
        let count = regions.len();
        let slot = regions.get_mut(index).ok_or_else(|| NestError::RegionIndex {
            entity: id.to_string(),
            index,
            count,
        })?;
        *slot = rect;
        Ok(())
    }

    pub fn regions(&self, id: &str) -> Result<&[Rect]> {
        Ok(&self.record(id)?.regions)
    }

    /// Every entity's regions, in id order
    pub fn all_regions(&self) -> impl Iterator<Item = (&EntityId, &[Rect])> + '_ {
        self.entities
            .iter()
            .map(|(id, record)| (id, record.regions.as_slice()))
    }
}

fn shape_error(id: &str, prop: &str, expected: &'static str) -> NestError {
    NestError::PropertyType {
        entity: id.to_string(),
        property: prop.to_string(),
        expected,
    }
}
