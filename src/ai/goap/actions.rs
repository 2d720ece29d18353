//! The stock action library of a ranged GOAP agent.

use std::sync::Arc;

use crate::ai::fixed_math::FixedNum;

use super::action::{ActionContext, ActionRun, GoapAction, MotionOrder, TaskStatus};
use super::world_state::{DistanceBand, WorldState};
use super::GoapSettings;

/// Close in until the target is no longer far.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproachMidRange;

impl GoapAction for ApproachMidRange {
    fn name(&self) -> &'static str {
        "ApproachMidRange"
    }

    fn precondition(&self, state: &WorldState) -> bool {
        state.distance_band == DistanceBand::Far
    }

    fn apply_effects(&self, mut state: WorldState) -> WorldState {
        state.distance_band = DistanceBand::Mid;
        state
    }

    fn safety_bound(&self, settings: &GoapSettings) -> FixedNum {
        settings.approach_timeout
    }

    fn step(&self, _run: &ActionRun, ctx: &mut ActionContext) -> TaskStatus {
        if ctx.target.is_none() {
            return TaskStatus::Aborted;
        }
        if ctx.band() != DistanceBand::Far {
            return TaskStatus::Done;
        }
        ctx.motion = MotionOrder::Pursue;
        TaskStatus::Running
    }
}

/// Walk toward the target until a line of sight opens up.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcquireLineOfSight;

impl GoapAction for AcquireLineOfSight {
    fn name(&self) -> &'static str {
        "AcquireLineOfSight"
    }

    fn precondition(&self, state: &WorldState) -> bool {
        state.distance_band != DistanceBand::Far && !state.low_health
    }

    fn apply_effects(&self, mut state: WorldState) -> WorldState {
        state.has_line_of_sight = true;
        state
    }

    fn safety_bound(&self, settings: &GoapSettings) -> FixedNum {
        settings.acquire_timeout
    }

    fn step(&self, _run: &ActionRun, ctx: &mut ActionContext) -> TaskStatus {
        if ctx.target.is_none() {
            return TaskStatus::Aborted;
        }
        if ctx.line_of_sight {
            return TaskStatus::Done;
        }
        if ctx.band() == DistanceBand::Far {
            return TaskStatus::Aborted;
        }
        ctx.motion = MotionOrder::Pursue;
        TaskStatus::Running
    }
}

/// Circle the target at the preferred radius until it comes into view.
/// Pricier than walking straight in, but still available at low health.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrafeOrbit;

impl GoapAction for StrafeOrbit {
    fn name(&self) -> &'static str {
        "StrafeOrbit"
    }

    fn cost(&self) -> FixedNum {
        FixedNum::from_num(2)
    }

    fn precondition(&self, state: &WorldState) -> bool {
        state.distance_band != DistanceBand::Far
    }

    fn apply_effects(&self, mut state: WorldState) -> WorldState {
        state.has_line_of_sight = true;
        state
    }

    fn safety_bound(&self, settings: &GoapSettings) -> FixedNum {
        settings.acquire_timeout
    }

    fn step(&self, _run: &ActionRun, ctx: &mut ActionContext) -> TaskStatus {
        if ctx.target.is_none() {
            return TaskStatus::Aborted;
        }
        if ctx.line_of_sight {
            return TaskStatus::Done;
        }
        ctx.motion = MotionOrder::Orbit {
            radius: ctx.settings.preferred_radius,
            clockwise: ctx.clockwise,
        };
        TaskStatus::Running
    }
}

/// Kite around the target while the weapon reloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitWeaponReady;

impl GoapAction for WaitWeaponReady {
    fn name(&self) -> &'static str {
        "WaitWeaponReady"
    }

    fn precondition(&self, state: &WorldState) -> bool {
        !state.weapon_ready
    }

    fn apply_effects(&self, mut state: WorldState) -> WorldState {
        state.weapon_ready = true;
        state
    }

    fn safety_bound(&self, settings: &GoapSettings) -> FixedNum {
        settings.wait_timeout
    }

    fn step(&self, _run: &ActionRun, ctx: &mut ActionContext) -> TaskStatus {
        if ctx.weapon.is_ready() {
            return TaskStatus::Done;
        }
        ctx.motion = match ctx.target {
            Some(_) => MotionOrder::Orbit {
                radius: ctx.settings.preferred_radius,
                clockwise: ctx.clockwise,
            },
            None => MotionOrder::Hold,
        };
        TaskStatus::Running
    }
}

/// Fire once, then hold still for a short settle time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shoot;

impl GoapAction for Shoot {
    fn name(&self) -> &'static str {
        "Shoot"
    }

    fn precondition(&self, state: &WorldState) -> bool {
        state.has_line_of_sight && state.distance_band != DistanceBand::Far && state.weapon_ready
    }

    // Readiness is spent at execution time and re-sensed next cycle.
    fn apply_effects(&self, mut state: WorldState) -> WorldState {
        state.did_attack = true;
        state
    }

    fn safety_bound(&self, settings: &GoapSettings) -> FixedNum {
        settings.shoot_settle * FixedNum::from_num(4)
    }

    fn step(&self, run: &ActionRun, ctx: &mut ActionContext) -> TaskStatus {
        ctx.motion = MotionOrder::Hold;
        if run.ticks() == 1 {
            let Some(target) = ctx.target else {
                return TaskStatus::Aborted;
            };
            let direction = (target.position - ctx.position).normalize();
            if !ctx.clear_shot || direction.is_zero() || !ctx.weapon.trigger() {
                return TaskStatus::Aborted;
            }
            ctx.fired = Some(direction);
        }
        if run.elapsed() >= ctx.settings.shoot_settle {
            TaskStatus::Done
        } else {
            TaskStatus::Running
        }
    }
}

/// Every action a ranged agent knows, in tie-break order.
pub fn default_library() -> Vec<Arc<dyn GoapAction>> {
    vec![
        Arc::new(ApproachMidRange),
        Arc::new(AcquireLineOfSight),
        Arc::new(StrafeOrbit),
        Arc::new(WaitWeaponReady),
        Arc::new(Shoot),
    ]
}
