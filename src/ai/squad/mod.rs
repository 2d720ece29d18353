//! Squad flocking: agents sharing a target gather in a contracting ring.
//!
//! - **registry**: target-keyed squads with generation-checked lazy reindexing
//! - **formation**: ring radius easing and slot geometry
//! - **flocking**: separation / cohesion / alignment / slot-seek composition
//! - **gather**: the per-agent coordinator used by the flock attack strategy

pub mod flocking;
pub mod formation;
pub mod gather;
pub mod registry;

pub use flocking::{FlockSettings, FlockWeights, Mate, MateSnapshot, SteeringTerms};
pub use formation::{slot_angle, slot_target, RingFormation, RingSettings};
pub use gather::{GatherAttack, GatherInput, GatherOutput, GatherSettings};
pub use registry::{Squad, SquadRegistry};

#[cfg(test)]
mod tests;
