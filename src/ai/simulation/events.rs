//! Messages exchanged between the AI core and its collaborators.

use bevy::prelude::*;

use super::components::AgentId;
use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::targeting::TargetId;

/// How an attack is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    /// Lands immediately if the target is within `range` of the attacker.
    Melee { damage: FixedNum, range: FixedNum },
    /// Spawns a projectile travelling along `direction` (unit length).
    Projectile {
        origin: FixedVec2,
        direction: FixedVec2,
        speed: FixedNum,
        damage: FixedNum,
    },
}

/// An agent triggered an attack this tick.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackIntent {
    pub attacker: AgentId,
    pub target: TargetId,
    pub kind: AttackKind,
}

/// A target left the world; squads and caches keyed on it are dropped.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDestroyed {
    pub target: TargetId,
}

/// An agent left the world; it drops out of its squad at the next reindex.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentDespawned {
    pub agent: AgentId,
}
