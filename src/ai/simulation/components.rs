//! Components shared by every agent kind.
//!
//! Positions and velocities are fixed-point so the AI core stays
//! deterministic; `to_vec2` is only used at the telemetry boundary.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::targeting::TargetSnapshot;

/// Stable per-agent identity. Squads sort on it, so it must never be reused
/// while an agent with the same id is alive.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

// ============================================================================
// Motion
// ============================================================================

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimPosition(pub FixedVec2);

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimVelocity(pub FixedVec2);

/// Velocity the AI asks for this tick; the integrator applies it.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DesiredVelocity(pub FixedVec2);

/// Where an agent returns when it loses its target.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HomePosition(pub FixedVec2);

/// Melee swings root the agent in place while they play.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mobility {
    pub can_move: bool,
}

impl Default for Mobility {
    fn default() -> Self {
        Self { can_move: true }
    }
}

// ============================================================================
// Combat state
// ============================================================================

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: FixedNum,
    pub max: FixedNum,
}

impl Health {
    pub fn new(max: FixedNum) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > FixedNum::ZERO
    }

    /// Current health as a fraction of max, zero when max is not positive.
    pub fn fraction(&self) -> FixedNum {
        if self.max <= FixedNum::ZERO {
            return FixedNum::ZERO;
        }
        self.current / self.max
    }

    pub fn apply_damage(&mut self, amount: FixedNum) {
        self.current = (self.current - amount).max(FixedNum::ZERO);
    }
}

/// Distance thresholds an agent reacts to.
///
/// Every agent kind exposes its ranges through this one component. Unset
/// fields fall back to the defaults below; the view range falls back to
/// the aggro range before the default.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeProfile {
    pub aggro: Option<FixedNum>,
    pub attack: Option<FixedNum>,
    pub view: Option<FixedNum>,
}

impl RangeProfile {
    pub const DEFAULT_AGGRO: f64 = 5.0;
    pub const DEFAULT_ATTACK: f64 = 1.5;
    pub const DEFAULT_VIEW: f64 = 8.0;

    pub fn new(aggro: FixedNum, attack: FixedNum, view: FixedNum) -> Self {
        Self {
            aggro: Some(aggro),
            attack: Some(attack),
            view: Some(view),
        }
    }

    pub fn aggro_range(&self) -> FixedNum {
        self.aggro.unwrap_or(FixedNum::from_num(Self::DEFAULT_AGGRO))
    }

    pub fn attack_range(&self) -> FixedNum {
        self.attack.unwrap_or(FixedNum::from_num(Self::DEFAULT_ATTACK))
    }

    pub fn view_range(&self) -> FixedNum {
        self.view
            .or(self.aggro)
            .unwrap_or(FixedNum::from_num(Self::DEFAULT_VIEW))
    }
}

/// What the sense pass saw this tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Perception {
    pub target: Option<TargetSnapshot>,
    pub distance: FixedNum,
    /// Discretized (Bresenham) line of sight to the target.
    pub line_of_sight: bool,
    /// Unobstructed straight segment to the target, used for shooting.
    pub clear_shot: bool,
}

impl Perception {
    pub fn within(&self, range: FixedNum) -> bool {
        self.target.is_some() && self.distance <= range
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Presentation hooks
// ============================================================================

/// Flags an animation collaborator would mirror.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationFlags {
    pub chasing: bool,
    pub attacking: bool,
}

/// Discrete label of what the agent is doing, for replication and overlays.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLabel(pub String);

impl ActionLabel {
    pub fn set(&mut self, label: &str) {
        if self.0 != label {
            self.0.clear();
            self.0.push_str(label);
        }
    }
}
