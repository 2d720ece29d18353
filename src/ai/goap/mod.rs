//! Goal-oriented action planning for ranged agents.
//!
//! - **world_state**: the fact vector and distance bands
//! - **action**: the [`GoapAction`] capability and the resumable [`ActionRun`]
//! - **actions**: the stock action library
//! - **planner**: greedy forward search with a step bound
//! - **executor**: the [`GoapAgent`] component (re-plan triggers, one step at a time)
//! - **systems**: ECS glue turning motion orders into velocities and shots into intents

pub mod action;
pub mod actions;
pub mod executor;
pub mod planner;
pub mod systems;
pub mod world_state;

pub use action::{ActionContext, ActionRun, GoapAction, MotionOrder, RunPhase, TaskStatus, Weapon};
pub use actions::{default_library, AcquireLineOfSight, ApproachMidRange, Shoot, StrafeOrbit, WaitWeaponReady};
pub use executor::{GoapAgent, GoapOutput, GoapSense};
pub use planner::{plan, Plan, PlanError, MAX_PLAN_STEPS};
pub use world_state::{DistanceBand, DistanceBands, WorldState};

use crate::ai::fixed_math::FixedNum;
use crate::ai::pathfinding::OrbitGains;

/// Tuning shared by every GOAP agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GoapSettings {
    pub bands: DistanceBands,
    pub fire_cooldown: FixedNum,
    pub replan_cooldown: FixedNum,
    pub move_speed: FixedNum,
    /// Health fraction at or below which the agent counts as low health.
    pub low_health_fraction: FixedNum,
    /// Orbit radius used while kiting or strafing.
    pub preferred_radius: FixedNum,
    pub orbit: OrbitGains,
    pub max_radial_speed: FixedNum,
    pub projectile_speed: FixedNum,
    pub projectile_damage: FixedNum,
    pub shoot_settle: FixedNum,
    pub approach_timeout: FixedNum,
    pub acquire_timeout: FixedNum,
    pub wait_timeout: FixedNum,
}

impl Default for GoapSettings {
    fn default() -> Self {
        Self {
            bands: DistanceBands::default(),
            fire_cooldown: FixedNum::from_num(0.8),
            replan_cooldown: FixedNum::from_num(0.5),
            move_speed: FixedNum::from_num(4),
            low_health_fraction: FixedNum::from_num(0.3),
            preferred_radius: FixedNum::from_num(3),
            orbit: OrbitGains::default(),
            max_radial_speed: FixedNum::from_num(2),
            projectile_speed: FixedNum::from_num(5),
            projectile_damage: FixedNum::from_num(10),
            shoot_settle: FixedNum::from_num(0.05),
            approach_timeout: FixedNum::from_num(6),
            acquire_timeout: FixedNum::from_num(3),
            wait_timeout: FixedNum::from_num(3),
        }
    }
}
