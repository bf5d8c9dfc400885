//! # World Context
//!
//! The per-session context object bundling the entity registry, component
//! store, tag index, and signal dispatcher. It is constructed once at
//! world-generation time, passed explicitly to everything that needs it, and
//! torn down at session end — there is no ambient global world.
//!
//! `World` is also the single sanctioned mutation path: every component
//! write, tag change, and destruction goes through it so the spatial tag can
//! never drift from the `Position` component, and no index can end up
//! referencing a dead entity.
//!
//! The model is single-threaded and turn-based. All mutation happens
//! synchronously on the calling thread; the bridging layer must finish world
//! construction before the first game-loop tick starts consuming it.

use crate::ecs::components::{Component, Name};
use crate::ecs::{
    ComponentStore, DispatchReport, Dispatcher, EntityId, EntityRegistry, Position, Signal,
    SignalPayload, Slot, SlotFailure, Tag, TagIndex,
};
use crate::{RogueError, RogueResult};
use log::{debug, warn};
use std::any::{Any, TypeId};
use std::collections::HashSet;

/// Whether the session is still being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionState {
    /// Game in progress
    #[default]
    Playing,
    /// A slot (usually the generated win/lose pipeline) ended the game
    Over,
}

/// One game session's entire mutable state.
///
/// # Examples
///
/// ```
/// use airogue::{Position, World};
///
/// let mut world = World::new();
/// let e = world.spawn();
/// world.set_component(e, Position::new(3, 4)).unwrap();
/// assert!(world.entities_at(Position::new(3, 4)).contains(&e));
/// ```
#[derive(Debug, Default)]
pub struct World {
    registry: EntityRegistry,
    components: ComponentStore,
    tags: TagIndex,
    dispatcher: Dispatcher,
    completion: CompletionState,
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    // --- entity lifecycle ---------------------------------------------

    /// Creates a fresh entity with no components or tags.
    pub fn spawn(&mut self) -> EntityId {
        let entity = self.registry.create();
        debug!("spawned entity {entity}");
        entity
    }

    /// Destroys `entity`, removing all of its components and tags so no
    /// index retains a reference to it. Idempotent: destroying a dead
    /// entity is a silent no-op.
    ///
    /// Slots referencing the entity stay registered; their bodies observe
    /// the absence and report failure through the dispatch report.
    pub fn despawn(&mut self, entity: EntityId) {
        if !self.registry.is_alive(entity) {
            return;
        }
        self.components.remove_all(entity);
        self.tags.remove_entity(entity);
        self.registry.destroy(entity);
        debug!("despawned entity {entity}");
    }

    /// True while `entity` is live.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.registry.is_alive(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    // --- component mutation (the sanctioned path) ---------------------

    /// Attaches or replaces `component` on `entity`.
    ///
    /// Fails with [`RogueError::UnknownEntity`] when `entity` is not alive.
    /// When the component is a [`Position`], the spatial tag is updated
    /// before this returns: callers can never observe a state where the
    /// position component and the position tag disagree.
    pub fn set_component<C: Component>(
        &mut self,
        entity: EntityId,
        component: C,
    ) -> RogueResult<()> {
        if !self.registry.is_alive(entity) {
            return Err(RogueError::UnknownEntity(entity));
        }
        if let Some(position) = (&component as &dyn Any).downcast_ref::<Position>() {
            self.tags.set_position_tag(entity, *position);
        }
        self.components.set(entity, component);
        Ok(())
    }

    /// Detaches component type `C` from `entity`, returning the prior
    /// value. No-op (returning `None`) when absent or when `entity` is
    /// dead. Removing `Position` clears the spatial tag in the same step.
    pub fn remove_component<C: Component>(&mut self, entity: EntityId) -> Option<C> {
        let removed = self.components.remove::<C>(entity);
        if removed.is_some() && TypeId::of::<C>() == TypeId::of::<Position>() {
            self.tags.clear_position_tag(entity);
        }
        removed
    }

    /// Reads component `C` on `entity`. Unknown or dead entities are simply
    /// absent, never an error.
    pub fn component<C: Component>(&self, entity: EntityId) -> Option<&C> {
        self.components.get(entity)
    }

    /// Mutable access to component `C` on `entity`.
    ///
    /// `Position` is excluded: in-place position edits would bypass the
    /// spatial tag, so positions move only through [`Self::set_component`].
    pub fn component_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut C> {
        if TypeId::of::<C>() == TypeId::of::<Position>() {
            return None;
        }
        self.components.get_mut(entity)
    }

    /// The set of component types attached to `entity`.
    pub fn all_components_of(&self, entity: EntityId) -> HashSet<TypeId> {
        self.components.all_of(entity)
    }

    // --- tags ----------------------------------------------------------

    /// Adds a marker tag. Idempotent; fails with
    /// [`RogueError::UnknownEntity`] when `entity` is dead.
    pub fn add_tag(&mut self, entity: EntityId, tag: Tag) -> RogueResult<()> {
        if !self.registry.is_alive(entity) {
            return Err(RogueError::UnknownEntity(entity));
        }
        self.tags.add_tag(entity, tag);
        Ok(())
    }

    /// Removes a marker tag. Idempotent no-op when absent or dead.
    pub fn remove_tag(&mut self, entity: EntityId, tag: &Tag) {
        self.tags.remove_tag(entity, tag);
    }

    /// True when `entity` carries `tag`.
    pub fn has_tag(&self, entity: EntityId, tag: &Tag) -> bool {
        self.tags.has_tag(entity, tag)
    }

    /// Entities occupying `coord`; empty when vacant.
    pub fn entities_at(&self, coord: Position) -> HashSet<EntityId> {
        self.tags.entities_at(coord)
    }

    /// Entities carrying ALL of `required`. An empty set is an input error
    /// (see [`crate::ecs::TagIndex::query`]).
    pub fn query_tags(&self, required: &[Tag]) -> RogueResult<HashSet<EntityId>> {
        self.tags.query(required)
    }

    // --- query engine ---------------------------------------------------

    /// Finds every entity owning all listed component types AND all listed
    /// tags (intersection across both criteria).
    ///
    /// The result is a finite snapshot taken at call time: mutations made
    /// while the caller iterates it are not observed. Unknown component
    /// types or tags produce an empty result, not an error — queries are
    /// existence checks, not schema validation. An empty axis constrains
    /// nothing, but asking with both axes empty is
    /// [`RogueError::AmbiguousQuery`], consistent with the tag-index
    /// policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use airogue::{component_type, Position, Tag, World};
    ///
    /// let mut world = World::new();
    /// let e = world.spawn();
    /// world.set_component(e, Position::new(1, 1)).unwrap();
    /// world.add_tag(e, Tag::IsItem).unwrap();
    ///
    /// let found = world
    ///     .find(&[component_type::<Position>()], &[Tag::IsItem])
    ///     .unwrap();
    /// assert_eq!(found, vec![e]);
    /// ```
    pub fn find(&self, components: &[TypeId], tags: &[Tag]) -> RogueResult<Vec<EntityId>> {
        if components.is_empty() && tags.is_empty() {
            return Err(RogueError::AmbiguousQuery(
                "find requires at least one component type or tag".into(),
            ));
        }
        let mut candidates: Option<HashSet<EntityId>> = None;
        if let Some((first, rest)) = components.split_first() {
            let mut owning = self.components.entities_with(*first);
            for component in rest {
                owning.retain(|entity| self.components.contains(*entity, *component));
            }
            candidates = Some(owning);
        }
        if !tags.is_empty() {
            let tagged = self.tags.query(tags)?;
            candidates = Some(match candidates {
                Some(owning) => owning.intersection(&tagged).copied().collect(),
                None => tagged,
            });
        }
        Ok(candidates.unwrap_or_default().into_iter().collect())
    }

    /// Looks up an entity by its `Name` component.
    ///
    /// Content pipelines address entities by the names the generator gave
    /// them. Linear scan; generated worlds hold tens of entities.
    pub fn find_named(&self, name: &str) -> Option<EntityId> {
        self.registry
            .iter()
            .find(|entity| matches!(self.components.get::<Name>(*entity), Some(Name(n)) if n == name))
    }

    // --- signals --------------------------------------------------------

    /// Subscribes `slot` to `signal`. Duplicate registrations are kept and
    /// each runs once per fire.
    pub fn connect(&mut self, signal: Signal, slot: Slot) {
        self.dispatcher.connect(signal, slot);
    }

    /// Removes the first registration of `slot` under `signal`, if any.
    pub fn disconnect(&mut self, signal: &Signal, slot: &Slot) {
        self.dispatcher.disconnect(signal, slot);
    }

    /// Number of registrations for `signal`.
    pub fn subscriber_count(&self, signal: &Signal) -> usize {
        self.dispatcher.subscriber_count(signal)
    }

    /// Fires `signal`, invoking every currently-subscribed slot in
    /// registration order with `payload`.
    ///
    /// The subscriber list is snapshotted before the first invocation, so
    /// slots may connect, disconnect, or re-entrantly `fire` without
    /// affecting the in-flight iteration; nested fires run depth-first to
    /// completion. A failing slot does not abort its siblings: failures are
    /// collected and returned in the [`DispatchReport`] after every slot
    /// has run. The only up-front error is a payload whose shape the signal
    /// does not accept.
    pub fn fire(&mut self, signal: Signal, payload: SignalPayload) -> RogueResult<DispatchReport> {
        if !signal.accepts(&payload) {
            return Err(RogueError::PayloadMismatch {
                signal: signal.to_string(),
                payload: payload.shape().to_string(),
            });
        }
        let slots = self.dispatcher.snapshot(&signal);
        let mut failures = Vec::new();
        for (index, slot) in slots.iter().enumerate() {
            if let Err(error) = slot.call(self, &payload) {
                warn!("slot '{}' failed during {signal}: {error}", slot.name());
                failures.push(SlotFailure {
                    signal: signal.clone(),
                    slot: slot.name().to_string(),
                    index,
                    error: error.to_string(),
                });
            }
        }
        Ok(DispatchReport {
            signal,
            invoked: slots.len(),
            failures,
        })
    }

    // --- session state --------------------------------------------------

    /// Current completion state of the session.
    pub fn completion(&self) -> CompletionState {
        self.completion
    }

    /// Marks the session over (or playing again, for tests).
    pub fn set_completion(&mut self, state: CompletionState) {
        self.completion = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{component_type, Graphic, Health};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_set_component_requires_live_entity() {
        let mut world = World::new();
        let e = world.spawn();
        world.despawn(e);
        assert!(matches!(
            world.set_component(e, Position::origin()),
            Err(RogueError::UnknownEntity(_))
        ));
        assert!(matches!(
            world.add_tag(e, Tag::IsItem),
            Err(RogueError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_position_and_tag_never_disagree() {
        let mut world = World::new();
        let e = world.spawn();
        world.set_component(e, Position::new(3, 4)).unwrap();
        world.set_component(e, Position::new(5, 6)).unwrap();
        assert!(world.entities_at(Position::new(3, 4)).is_empty());
        assert!(world.entities_at(Position::new(5, 6)).contains(&e));

        world.remove_component::<Position>(e);
        assert!(world.entities_at(Position::new(5, 6)).is_empty());
    }

    #[test]
    fn test_component_mut_refuses_position() {
        let mut world = World::new();
        let e = world.spawn();
        world.set_component(e, Position::origin()).unwrap();
        assert!(world.component_mut::<Position>(e).is_none());
        // Other components are freely mutable in place.
        world.set_component(e, Health::new(10)).unwrap();
        world.component_mut::<Health>(e).unwrap().current = 7;
        assert_eq!(world.component::<Health>(e).unwrap().current, 7);
    }

    #[test]
    fn test_despawn_cascades_and_is_idempotent() {
        let mut world = World::new();
        let e = world.spawn();
        world.set_component(e, Position::new(2, 2)).unwrap();
        world.add_tag(e, Tag::IsItem).unwrap();
        world.despawn(e);
        world.despawn(e);
        assert!(!world.is_alive(e));
        assert!(world.entities_at(Position::new(2, 2)).is_empty());
        assert!(world.query_tags(&[Tag::IsItem]).unwrap().is_empty());
        assert!(world.component::<Position>(e).is_none());
    }

    #[test]
    fn test_find_intersects_components_and_tags() {
        let mut world = World::new();
        let e1 = world.spawn();
        world.set_component(e1, Position::origin()).unwrap();
        world.add_tag(e1, Tag::IsItem).unwrap();
        let e2 = world.spawn();
        world.set_component(e2, Position::new(1, 0)).unwrap();

        let found = world
            .find(&[component_type::<Position>()], &[Tag::IsItem])
            .unwrap();
        assert_eq!(found, vec![e1]);

        world.remove_component::<Position>(e1);
        let found = world
            .find(&[component_type::<Position>()], &[Tag::IsItem])
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_find_unknown_criteria_is_empty_not_error() {
        let world = World::new();
        let found = world
            .find(&[component_type::<Graphic>()], &[Tag::Custom("Nope".into())])
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_find_with_no_criteria_is_ambiguous() {
        let world = World::new();
        assert!(matches!(
            world.find(&[], &[]),
            Err(RogueError::AmbiguousQuery(_))
        ));
    }

    #[test]
    fn test_find_is_a_snapshot() {
        let mut world = World::new();
        let e1 = world.spawn();
        world.set_component(e1, Graphic::new('a')).unwrap();
        let found = world.find(&[component_type::<Graphic>()], &[]).unwrap();
        // Mutating after the call does not change the returned snapshot.
        let e2 = world.spawn();
        world.set_component(e2, Graphic::new('b')).unwrap();
        assert_eq!(found, vec![e1]);
    }

    #[test]
    fn test_fire_runs_slots_in_order_with_payload() {
        let mut world = World::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let seen = Rc::clone(&seen);
            Slot::new("first", move |_, payload| {
                if let SignalPayload::Turn { turn } = payload {
                    seen.borrow_mut().push(("first", *turn));
                }
                Ok(())
            })
        };
        let second = {
            let seen = Rc::clone(&seen);
            Slot::new("second", move |_, payload| {
                if let SignalPayload::Turn { turn } = payload {
                    seen.borrow_mut().push(("second", *turn));
                }
                Ok(())
            })
        };
        world.connect(Signal::Tick, first);
        world.connect(Signal::Tick, second);

        let report = world
            .fire(Signal::Tick, SignalPayload::Turn { turn: 3 })
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(report.invoked, 2);
        assert_eq!(*seen.borrow(), vec![("first", 3), ("second", 3)]);
    }

    #[test]
    fn test_duplicate_registration_fires_twice() {
        let mut world = World::new();
        let count = Rc::new(RefCell::new(0));
        let slot = {
            let count = Rc::clone(&count);
            Slot::new("counter", move |_, _| {
                *count.borrow_mut() += 1;
                Ok(())
            })
        };
        world.connect(Signal::GameStart, slot.clone());
        world.connect(Signal::GameStart, slot);
        world.fire(Signal::GameStart, SignalPayload::Empty).unwrap();
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_failing_slot_does_not_abort_siblings() {
        let mut world = World::new();
        let count = Rc::new(RefCell::new(0));
        let counting = |count: &Rc<RefCell<i32>>| {
            let count = Rc::clone(count);
            Slot::new("counting", move |_, _| {
                *count.borrow_mut() += 1;
                Ok(())
            })
        };
        world.connect(Signal::GameStart, counting(&count));
        world.connect(
            Signal::GameStart,
            Slot::new("broken", |_, _| {
                Err(RogueError::SlotFailed("out of mana".into()))
            }),
        );
        world.connect(Signal::GameStart, counting(&count));

        let report = world.fire(Signal::GameStart, SignalPayload::Empty).unwrap();
        assert_eq!(report.invoked, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].slot, "broken");
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_slot_mutating_subscriptions_does_not_affect_in_flight_fire() {
        let mut world = World::new();
        let count = Rc::new(RefCell::new(0));
        let registering = {
            let count = Rc::clone(&count);
            Slot::new("registering", move |world, _| {
                let count = Rc::clone(&count);
                world.connect(
                    Signal::GameStart,
                    Slot::new("late", move |_, _| {
                        *count.borrow_mut() += 10;
                        Ok(())
                    }),
                );
                Ok(())
            })
        };
        world.connect(Signal::GameStart, registering);
        let report = world.fire(Signal::GameStart, SignalPayload::Empty).unwrap();
        // The slot registered mid-dispatch did not run in this fire.
        assert_eq!(report.invoked, 1);
        assert_eq!(*count.borrow(), 0);
        // But it is subscribed for the next one.
        world.fire(Signal::GameStart, SignalPayload::Empty).unwrap();
        assert_eq!(*count.borrow(), 10);
    }

    #[test]
    fn test_reentrant_fire_runs_depth_first() {
        let mut world = World::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let inner = {
            let order = Rc::clone(&order);
            Slot::new("inner", move |_, _| {
                order.borrow_mut().push("inner");
                Ok(())
            })
        };
        world.connect(Signal::Scripted("inner".into()), inner);
        let outer = {
            let order = Rc::clone(&order);
            Slot::new("outer", move |world, _| {
                order.borrow_mut().push("outer-before");
                world.fire(Signal::Scripted("inner".into()), SignalPayload::Empty)?;
                order.borrow_mut().push("outer-after");
                Ok(())
            })
        };
        world.connect(Signal::GameStart, outer);

        world.fire(Signal::GameStart, SignalPayload::Empty).unwrap();
        assert_eq!(*order.borrow(), vec!["outer-before", "inner", "outer-after"]);
    }

    #[test]
    fn test_fire_rejects_mismatched_payload() {
        let mut world = World::new();
        assert!(matches!(
            world.fire(Signal::Tick, SignalPayload::Empty),
            Err(RogueError::PayloadMismatch { .. })
        ));
    }

    #[test]
    fn test_find_named() {
        let mut world = World::new();
        let e = world.spawn();
        world.set_component(e, Name("Game".into())).unwrap();
        assert_eq!(world.find_named("Game"), Some(e));
        assert_eq!(world.find_named("Nobody"), None);
    }
}
