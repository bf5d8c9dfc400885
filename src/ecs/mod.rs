//! # ECS Core
//!
//! Entity identity, component storage, tag indexing, queries, and signal
//! dispatch — the runtime every generated world lives in.
//!
//! This module contains the correctness-critical heart of airogue:
//! - Entity registry for identifier lifecycle
//! - Typed component storage with a single sanctioned mutation path
//! - Tag index mirroring component state for categorical and spatial queries
//! - Query engine intersecting component and tag criteria
//! - Signal/slot dispatcher for content-defined reactive behavior
//!
//! All of it is single-threaded by design: mutation happens synchronously on
//! the calling thread, one logical owner (the game loop) per session.

pub mod components;
pub mod registry;
pub mod signals;
pub mod tags;
pub mod world;

pub use components::{
    component_type, Attributes, Component, ComponentStore, Description, Gold, Graphic, Health,
    Name,
};
pub use registry::EntityRegistry;
pub use signals::{DispatchReport, Dispatcher, Signal, SignalPayload, Slot, SlotFailure};
pub use tags::{Tag, TagIndex};
pub use world::{CompletionState, World};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for game entities.
///
/// An entity carries no data of its own; it is only a key into the component
/// store and tag index. Destroyed identifiers are retired, never reused, so
/// live identifiers cannot collide.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// Represents a 2D coordinate in the game world.
///
/// `Position` doubles as a component: attaching it to an entity through
/// [`World::set_component`] keeps the spatial tag index in sync.
///
/// # Examples
///
/// ```
/// use airogue::Position;
///
/// let pos = Position::new(3, 4);
/// assert_eq!(pos + Position::new(1, 1), Position::new(4, 5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Returns true when the position lies inside an exclusive
    /// width × height console rectangle anchored at the origin.
    pub fn in_bounds(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.y >= 0 && self.y < height
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
