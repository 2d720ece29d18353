//! Simulation shell around the AI core.
//!
//! This module is organized into:
//! - **components**: agent state (position, velocity, health, ranges, perception)
//! - **resources**: tick counter, seeded RNG, id allocation
//! - **events**: attack intents and lifecycle notifications
//! - **systems**: sensing, bookkeeping and motion integration

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;

pub use components::*;
pub use events::*;
pub use resources::*;

/// Ordered phases of one AI tick inside `FixedUpdate`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum AiSet {
    Sense,     // Tick counter, registry sync, cleanup, target selection
    Decide,    // Behavior brains and GOAP agents
    Integrate, // Apply desired velocities, move projectiles
    Resolve,   // Damage and death
}
