//! Idle / Chase / Attack behavior for enemies.
//!
//! The [`EnemyBrain`] component owns one strategy per state and switches
//! between them; strategies call into the pathfinder, the squad coordinator
//! and the visibility grid.

pub mod attack;
pub mod brain;
pub mod chase;
pub mod idle;
pub mod systems;

pub use attack::{AttackStrategy, AttackTick, MeleeSettings, ProjectileSettings};
pub use brain::{BehaviorState, BrainContext, BrainOutput, EnemyBrain};
pub use chase::{ChaseStrategy, DotGridSettings, LosChaseSettings};
pub use idle::{IdleStrategy, WanderSettings};

#[cfg(test)]
mod tests;
