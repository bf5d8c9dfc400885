//! # Component Store
//!
//! Typed per-entity storage. A component is pure data: a value of some Rust
//! type attached to at most one entity slot per type. Entity "kinds" do not
//! exist — what an entity is follows entirely from which component types and
//! tags it carries.
//!
//! The store itself performs no liveness checks and no tag mirroring; those
//! invariants are enforced by [`crate::World`], the single sanctioned
//! mutation path. Code that writes to a raw `ComponentStore` directly can
//! desynchronize the spatial index, which is exactly the bug class the
//! `World` wrapper exists to prevent.

use crate::ecs::{EntityId, Position};
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};

/// Marker trait for component types.
///
/// Components are plain data with no embedded behavior. Any `'static` type
/// with a `Debug` impl qualifies; implement this trait to opt a type in.
pub trait Component: Any + std::fmt::Debug + 'static {}

/// Returns the storage key for component type `C`.
///
/// Queries take component criteria as `TypeId`s so the set of component
/// types stays open-ended.
///
/// # Examples
///
/// ```
/// use airogue::{component_type, Position, Graphic};
///
/// assert_ne!(component_type::<Position>(), component_type::<Graphic>());
/// ```
pub fn component_type<C: Component>() -> TypeId {
    TypeId::of::<C>()
}

/// On-screen representation: a character and a foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Graphic {
    pub ch: char,
    pub fg: (u8, u8, u8),
}

impl Graphic {
    /// Creates a graphic with the default white foreground.
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            fg: (255, 255, 255),
        }
    }

    /// Creates a graphic with an explicit foreground color.
    pub fn with_fg(ch: char, fg: (u8, u8, u8)) -> Self {
        Self { ch, fg }
    }
}

/// Display name of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

/// Flavor text attached to an entity, usually generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description(pub String);

/// Currency carried by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gold(pub i64);

/// Hit points of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: i64,
    pub max: i64,
}

impl Health {
    /// Creates a health component at full hit points.
    pub fn new(max: i64) -> Self {
        Self { current: max, max }
    }
}

/// Free-form state for generated (scripted) components.
///
/// Content bundles describe entity state as named attributes with arbitrary
/// JSON values; the builtin slot library reads and writes entries here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(pub HashMap<String, Value>);

impl Component for Position {}
impl Component for Graphic {}
impl Component for Name {}
impl Component for Description {}
impl Component for Gold {}
impl Component for Health {}
impl Component for Attributes {}

struct StoredComponent {
    value: Box<dyn Any>,
    type_name: &'static str,
}

/// Per-entity keyed container mapping component type to value.
///
/// Each entity holds at most one value per component type; setting an
/// already-present type replaces the prior value.
#[derive(Default)]
pub struct ComponentStore {
    by_entity: HashMap<EntityId, HashMap<TypeId, StoredComponent>>,
}

impl ComponentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            by_entity: HashMap::new(),
        }
    }

    /// Attaches or replaces a value of `C` on `entity`.
    pub fn set<C: Component>(&mut self, entity: EntityId, component: C) {
        self.by_entity.entry(entity).or_default().insert(
            TypeId::of::<C>(),
            StoredComponent {
                value: Box::new(component),
                type_name: std::any::type_name::<C>(),
            },
        );
    }

    /// Returns the value of `C` on `entity`, or `None` when absent.
    ///
    /// Absence is an explicit result, never a default placeholder.
    pub fn get<C: Component>(&self, entity: EntityId) -> Option<&C> {
        self.by_entity
            .get(&entity)?
            .get(&TypeId::of::<C>())?
            .value
            .downcast_ref::<C>()
    }

    /// Mutable access to the value of `C` on `entity`.
    pub fn get_mut<C: Component>(&mut self, entity: EntityId) -> Option<&mut C> {
        self.by_entity
            .get_mut(&entity)?
            .get_mut(&TypeId::of::<C>())?
            .value
            .downcast_mut::<C>()
    }

    /// Detaches `C` from `entity`, returning the prior value. No-op when the
    /// component is absent.
    pub fn remove<C: Component>(&mut self, entity: EntityId) -> Option<C> {
        let stored = self.by_entity.get_mut(&entity)?.remove(&TypeId::of::<C>())?;
        stored.value.downcast::<C>().ok().map(|boxed| *boxed)
    }

    /// True when `entity` carries a value of the given component type.
    pub fn contains(&self, entity: EntityId, type_id: TypeId) -> bool {
        self.by_entity
            .get(&entity)
            .is_some_and(|components| components.contains_key(&type_id))
    }

    /// The set of component types currently attached to `entity`.
    pub fn all_of(&self, entity: EntityId) -> HashSet<TypeId> {
        self.by_entity
            .get(&entity)
            .map(|components| components.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Human-readable type names attached to `entity`, for diagnostics.
    pub fn type_names(&self, entity: EntityId) -> Vec<&'static str> {
        self.by_entity
            .get(&entity)
            .map(|components| components.values().map(|stored| stored.type_name).collect())
            .unwrap_or_default()
    }

    /// Drops every component attached to `entity`.
    pub fn remove_all(&mut self, entity: EntityId) {
        self.by_entity.remove(&entity);
    }

    /// Entities that carry a value of the given component type.
    pub fn entities_with(&self, type_id: TypeId) -> HashSet<EntityId> {
        self.by_entity
            .iter()
            .filter(|(_, components)| components.contains_key(&type_id))
            .map(|(entity, _)| *entity)
            .collect()
    }
}

impl std::fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (entity, components) in &self.by_entity {
            let names: Vec<_> = components.values().map(|stored| stored.type_name).collect();
            map.entry(entity, &names);
        }
        map.finish()
    }
}
