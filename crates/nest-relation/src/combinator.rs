//! Relation combinator: reactive, keyed aggregation over a dynamic relative set

use nest_core::{EntityId, Result};
use nest_world::{Delta, Relation, World};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use tracing::debug;

type Projection<V> = Rc<dyn Fn(&World, &EntityId) -> Result<Option<V>>>;
type Aggregate<V> = Rc<dyn Fn(&mut World, &BTreeMap<EntityId, V>) -> Result<()>>;
type Hook = Rc<dyn Fn(&mut World, &EntityId) -> Result<()>>;

/// Parameters of one relation subscription.
///
/// `project` filters and maps a relative to the value kept for it (`None`
/// drops it from the state). `aggregate` receives the whole keyed state
/// after every change and should be cheap and idempotent.
pub struct RelationSubscription<V> {
    target: EntityId,
    relation: Relation,
    label: String,
    tracked: Vec<String>,
    project: Projection<V>,
    aggregate: Aggregate<V>,
    on_enter: Option<Hook>,
    on_exit: Option<Hook>,
}

impl<V: Clone + 'static> RelationSubscription<V> {
    pub fn new(
        target: impl Into<EntityId>,
        relation: Relation,
        label: impl Into<String>,
        project: impl Fn(&World, &EntityId) -> Result<Option<V>> + 'static,
        aggregate: impl Fn(&mut World, &BTreeMap<EntityId, V>) -> Result<()> + 'static,
    ) -> Self {
        Self {
            target: target.into(),
            relation,
            label: label.into(),
            tracked: Vec::new(),
            project: Rc::new(project),
            aggregate: Rc::new(aggregate),
            on_enter: None,
            on_exit: None,
        }
    }

    /// Re-project a relative whenever this property of it changes. May be
    /// called more than once to track several properties.
    pub fn with_tracked(mut self, property: impl Into<String>) -> Self {
        self.tracked.push(property.into());
        self
    }

    pub fn with_enter(
        mut self,
        hook: impl Fn(&mut World, &EntityId) -> Result<()> + 'static,
    ) -> Self {
        self.on_enter = Some(Rc::new(hook));
        self
    }

    pub fn with_exit(
        mut self,
        hook: impl Fn(&mut World, &EntityId) -> Result<()> + 'static,
    ) -> Self {
        self.on_exit = Some(Rc::new(hook));
        self
    }
}

struct Combinator<V> {
    spec: RelationSubscription<V>,
    /// Label used for tracked-property subscriptions on relatives. It is
    /// qualified with the target so two targets sharing a rule label never
    /// overwrite each other's handler on a common relative.
    tracked_label: String,
    /// Relatives currently present in the relation
    members: RefCell<BTreeSet<EntityId>>,
    /// Relative -> last non-absent projection
    state: RefCell<BTreeMap<EntityId, V>>,
}

impl<V: Clone + 'static> Combinator<V> {
    fn on_relation(self: &Rc<Self>, world: &mut World, delta: Option<&Delta>) -> Result<()> {
        // Writes without a delta carry no membership transitions.
        let Some(delta) = delta else {
            return Ok(());
        };

        for (relative, change) in delta.iter() {
            if change.exited() {
                self.exit(world, relative)?;
            } else if change.entered() {
                self.enter(world, relative)?;
            }
        }
        Ok(())
    }

    fn enter(self: &Rc<Self>, world: &mut World, relative: &EntityId) -> Result<()> {
        if !self.members.borrow_mut().insert(relative.clone()) {
            return Ok(());
        }
        debug!(target_entity = %self.spec.target, label = %self.spec.label, relative = %relative, "enter");

        if let Some(hook) = &self.spec.on_enter {
            hook(world, relative)?;
        }

        for property in &self.spec.tracked {
            let this = Rc::clone(self);
            let tracked_relative = relative.clone();
            world.subscribe(relative, property, self.tracked_label.clone(), move |w, _| {
                this.refresh(w, &tracked_relative)
            })?;
        }

        self.refresh(world, relative)
    }

    fn exit(&self, world: &mut World, relative: &EntityId) -> Result<()> {
        if !self.members.borrow_mut().remove(relative) {
            return Ok(());
        }
        debug!(target_entity = %self.spec.target, label = %self.spec.label, relative = %relative, "exit");

        if let Some(hook) = &self.spec.on_exit {
            hook(world, relative)?;
        }

        self.state.borrow_mut().remove(relative);
        for property in &self.spec.tracked {
            world.unsubscribe(relative, property, &self.tracked_label)?;
        }

        self.notify(world)
    }

    fn refresh(&self, world: &mut World, relative: &EntityId) -> Result<()> {
        // Tracked handlers can outlive membership by one fan-out when an exit
        // hook writes the tracked property itself.
        if !self.members.borrow().contains(relative) {
            return Ok(());
        }

        let projected = (self.spec.project)(world, relative)?;
        {
            let mut state = self.state.borrow_mut();
            match projected {
                Some(value) => {
                    state.insert(relative.clone(), value);
                }
                None => {
                    state.remove(relative);
                }
            }
        }
        self.notify(world)
    }

    fn notify(&self, world: &mut World) -> Result<()> {
        // The aggregate may cascade back into this combinator, so it gets a
        // snapshot rather than a live borrow.
        let snapshot = self.state.borrow().clone();
        (self.spec.aggregate)(world, &snapshot)
    }
}

/// Handle to an installed relation subscription
pub struct RelationHandle<V> {
    combinator: Rc<Combinator<V>>,
}

impl<V: Clone + 'static> RelationHandle<V> {
    /// Current keyed state
    pub fn state(&self) -> BTreeMap<EntityId, V> {
        self.combinator.state.borrow().clone()
    }

    /// Relatives currently in the relation, projected or not
    pub fn members(&self) -> BTreeSet<EntityId> {
        self.combinator.members.borrow().clone()
    }

    /// Remove the relation listener and every tracked-property listener.
    /// Exit hooks do not run.
    pub fn detach(self, world: &mut World) -> Result<()> {
        let spec = &self.combinator.spec;
        world.unsubscribe(&spec.target, spec.relation.property(), &spec.label)?;
        for property in &spec.tracked {
            for relative in self.combinator.members.borrow().iter() {
                world.unsubscribe(relative, property, &self.combinator.tracked_label)?;
            }
        }
        self.combinator.members.borrow_mut().clear();
        self.combinator.state.borrow_mut().clear();
        Ok(())
    }
}

/// Install a relation combinator on `spec.target`.
///
/// Relatives already present are entered one at a time, each seeding its
/// own state entry and aggregate call. With no relatives present the
/// aggregate runs once on the empty state.
pub fn subscribe_relation<V: Clone + 'static>(
    world: &mut World,
    spec: RelationSubscription<V>,
) -> Result<RelationHandle<V>> {
    let tracked_label = format!("{}@{}", spec.label, spec.target);
    let combinator = Rc::new(Combinator {
        spec,
        tracked_label,
        members: RefCell::new(BTreeSet::new()),
        state: RefCell::new(BTreeMap::new()),
    });

    let target = combinator.spec.target.clone();
    let relation = combinator.spec.relation;
    let this = Rc::clone(&combinator);
    world.subscribe(
        &target,
        relation.property(),
        combinator.spec.label.clone(),
        move |w, delta| this.on_relation(w, delta),
    )?;

    let present = world.counts(&target, relation)?;
    for relative in present.keys() {
        combinator.enter(world, relative)?;
    }
    // An empty relation still gets one aggregate call so rules can settle
    // their initial verdict (e.g. a minimum that starts out violated).
    if present.is_empty() {
        combinator.notify(world)?;
    }

    Ok(RelationHandle { combinator })
}
