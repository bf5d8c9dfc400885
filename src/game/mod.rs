//! # Game Layer
//!
//! The thin layer between generated content and the ECS core:
//!
//! - [`slots`]: the fixed vocabulary of builtin slot functions every
//!   generated pipeline compiles down to
//! - [`bootstrap`]: world construction from a finished content bundle
//!
//! Rendering and input handling live outside the crate; they consume the
//! [`crate::World`] this layer builds.

pub mod bootstrap;
pub mod slots;

pub use bootstrap::build_world;
