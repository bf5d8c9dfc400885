//! # Entity Registry
//!
//! Owns the set of live entity identifiers. Everything else in the ECS keys
//! off the identifiers minted here.
//!
//! The registry only tracks liveness. Cascading cleanup of components and
//! tags on destruction is the job of [`crate::World`], which is the single
//! mutation path callers are expected to use.

use crate::ecs::{new_entity_id, EntityId};
use std::collections::HashSet;

/// Tracks which entity identifiers are currently live.
///
/// Identifiers are v4 UUIDs: destroyed ids are retired rather than recycled,
/// so a live id can never collide with a past or future one.
///
/// # Examples
///
/// ```
/// use airogue::ecs::EntityRegistry;
///
/// let mut registry = EntityRegistry::new();
/// let e = registry.create();
/// assert!(registry.is_alive(e));
/// registry.destroy(e);
/// assert!(!registry.is_alive(e));
/// ```
#[derive(Debug, Default)]
pub struct EntityRegistry {
    alive: HashSet<EntityId>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            alive: HashSet::new(),
        }
    }

    /// Mints a fresh entity identifier and records it as live.
    pub fn create(&mut self) -> EntityId {
        let id = new_entity_id();
        self.alive.insert(id);
        id
    }

    /// Removes `entity` from the live set. Idempotent: destroying an already
    /// dead entity is a no-op.
    pub fn destroy(&mut self, entity: EntityId) {
        self.alive.remove(&entity);
    }

    /// Returns true while `entity` has been created and not yet destroyed.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    /// Iterates over all live entities in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive.iter().copied()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    /// True when no entities are live.
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }
}
