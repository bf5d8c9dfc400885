//! # Airogue
//!
//! A roguelike whose playable content — theme, plot, mechanics, and items —
//! is produced by a chain of LLM calls and then materialized into an
//! entity-component-system world.
//!
//! ## Architecture Overview
//!
//! The crate is organized around a small, correctness-critical core and a
//! thin game layer on top of it:
//!
//! - **ECS Core**: entity identity, typed component storage, tag indexing
//!   (including the position-derived spatial tag), queries, and a signal/slot
//!   dispatcher that lets generated content define reactive behavior
//! - **Content Model**: the structured bundle the generation pipeline
//!   produces (theme, plot, mechanics, items, scripted entities)
//! - **Game Layer**: the builtin slot vocabulary all generated behavior
//!   compiles down to, and the bootstrap that turns a content bundle into a
//!   live world
//!
//! The LLM pipeline itself and the terminal render/input loop are external
//! collaborators: the pipeline hands this crate a finished
//! [`WorldModel`], and the loop reads entity state through [`World`]
//! queries and fires signals in response to input.

pub mod content;
pub mod ecs;
pub mod game;

pub use content::{
    ComponentModel, EntityModel, GameMechanic, GameMechanics, Item, Items, Pipeline,
    ScriptedAction, WorldModel,
};
pub use ecs::{
    component_type, Attributes, CompletionState, Component, Description, DispatchReport, EntityId,
    Gold, Graphic, Health, Name, Position, Signal, SignalPayload, Slot, SlotFailure, Tag, World,
};
pub use game::{bootstrap::build_world, slots};

/// Core error type for the airogue engine.
#[derive(thiserror::Error, Debug)]
pub enum RogueError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Operation referenced a dead or never-created entity
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// A query was issued with no criteria at all
    #[error("Ambiguous query: {0}")]
    AmbiguousQuery(String),

    /// A signal was fired with a payload shape it does not accept
    #[error("Signal {signal} does not accept payload {payload}")]
    PayloadMismatch { signal: String, payload: String },

    /// A scripted action referenced a slot name that is not a builtin
    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    /// A content bundle failed validation
    #[error("Invalid content: {0}")]
    InvalidContent(String),

    /// A slot handler reported failure during dispatch
    #[error("Slot failed: {0}")]
    SlotFailed(String),
}

/// Result type used throughout the airogue codebase.
pub type RogueResult<T> = Result<T, RogueError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Console width in cells
    pub const MAP_WIDTH: i32 = 80;

    /// Console height in cells
    pub const MAP_HEIGHT: i32 = 50;

    /// Where the player starts
    pub const PLAYER_START: (i32, i32) = (5, 5);

    /// How many items from the generated item list are scattered on the map
    pub const ITEM_SCATTER_COUNT: usize = 20;

    /// Items are scattered with coordinates in `0..=SCATTER_EXTENT`
    pub const SCATTER_EXTENT: i32 = 20;
}
