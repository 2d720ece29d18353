//! The action capability and its resumable execution state.

use std::fmt::Debug;

use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::targeting::TargetSnapshot;

use super::world_state::{DistanceBand, WorldState};
use super::GoapSettings;

/// Outcome of resuming an action for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Done,
    /// Ran past the action's safety bound.
    TimedOut,
    /// The action noticed it can no longer make progress (target lost,
    /// no clear shot, ...).
    Aborted,
}

impl TaskStatus {
    pub fn is_finished(self) -> bool {
        self != TaskStatus::Running
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunPhase {
    #[default]
    NotStarted,
    Running,
    Finished(TaskStatus),
}

/// Movement an action wants this tick; the host system turns it into a velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionOrder {
    #[default]
    Hold,
    /// Path toward the target.
    Pursue,
    /// Circle the target at `radius`.
    Orbit { radius: FixedNum, clockwise: bool },
}

/// Reload timer of a ranged agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Weapon {
    pub cooldown: FixedNum,
    remaining: FixedNum,
}

impl Weapon {
    pub fn new(cooldown: FixedNum) -> Self {
        Self {
            cooldown,
            remaining: FixedNum::ZERO,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= FixedNum::ZERO
    }

    pub fn remaining(&self) -> FixedNum {
        self.remaining
    }

    pub fn tick(&mut self, dt: FixedNum) {
        self.remaining = (self.remaining - dt).max(FixedNum::ZERO);
    }

    /// Start the reload. Returns false if the weapon was not ready.
    pub fn trigger(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.remaining = self.cooldown;
        true
    }
}

/// What an action sees and may change while it runs.
#[derive(Debug)]
pub struct ActionContext<'a> {
    pub dt: FixedNum,
    pub position: FixedVec2,
    pub target: Option<TargetSnapshot>,
    pub distance: FixedNum,
    pub line_of_sight: bool,
    pub clear_shot: bool,
    pub settings: &'a GoapSettings,
    pub weapon: &'a mut Weapon,
    /// Alternates per agent so neighbours orbit in opposite directions.
    pub clockwise: bool,
    pub motion: MotionOrder,
    /// Direction of a shot fired this tick.
    pub fired: Option<FixedVec2>,
}

impl ActionContext<'_> {
    pub fn band(&self) -> DistanceBand {
        if self.target.is_none() {
            return DistanceBand::Far;
        }
        self.settings.bands.classify(self.distance)
    }
}

/// A planner action: a stateless descriptor with declarative preconditions
/// and effects plus a cooperative execution routine.
///
/// Execution state lives in [`ActionRun`]; `step` is called once per tick
/// until it returns something other than [`TaskStatus::Running`].
pub trait GoapAction: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn cost(&self) -> FixedNum {
        FixedNum::from_num(1)
    }

    fn precondition(&self, state: &WorldState) -> bool;

    fn apply_effects(&self, state: WorldState) -> WorldState;

    /// Seconds after which a still-running step is cut off.
    fn safety_bound(&self, settings: &GoapSettings) -> FixedNum;

    fn start(&self, _ctx: &mut ActionContext) {}

    fn step(&self, run: &ActionRun, ctx: &mut ActionContext) -> TaskStatus;

    fn finish(&self, _status: TaskStatus, _ctx: &mut ActionContext) {}
}

/// Explicit step-state of one action execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionRun {
    phase: RunPhase,
    elapsed: FixedNum,
    ticks: u32,
}

impl ActionRun {
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Seconds spent running, including the current tick.
    pub fn elapsed(&self) -> FixedNum {
        self.elapsed
    }

    /// Number of times the action has been resumed, including the current one.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, RunPhase::Finished(_))
    }

    /// Resume the action for one tick. A finished run keeps returning its
    /// final status without touching the action again.
    pub fn resume(&mut self, action: &dyn GoapAction, ctx: &mut ActionContext) -> TaskStatus {
        match self.phase {
            RunPhase::Finished(status) => return status,
            RunPhase::NotStarted => {
                action.start(ctx);
                self.phase = RunPhase::Running;
            }
            RunPhase::Running => {}
        }

        self.elapsed += ctx.dt;
        self.ticks += 1;

        let mut status = action.step(self, ctx);
        if status == TaskStatus::Running && self.elapsed >= action.safety_bound(ctx.settings) {
            status = TaskStatus::TimedOut;
        }
        if status.is_finished() {
            action.finish(status, ctx);
            self.phase = RunPhase::Finished(status);
        }
        status
    }
}
