use std::sync::Arc;

use bevy::prelude::*;

use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::targeting::TargetSnapshot;

use super::action::{ActionContext, ActionRun, GoapAction, MotionOrder, RunPhase, TaskStatus, Weapon};
use super::actions::default_library;
use super::planner::{plan, Plan, PlanError};
use super::world_state::WorldState;
use super::GoapSettings;

/// Sensed inputs for one executor tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GoapSense {
    pub target: Option<TargetSnapshot>,
    pub distance: FixedNum,
    pub line_of_sight: bool,
    pub clear_shot: bool,
    pub health_fraction: FixedNum,
}

/// What the executor asks of the host this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GoapOutput {
    pub motion: MotionOrder,
    /// Unit direction of a shot fired this tick.
    pub fired: Option<FixedVec2>,
}

/// Plans and executes GOAP actions one step at a time.
#[derive(Component, Debug, Clone)]
pub struct GoapAgent {
    library: Vec<Arc<dyn GoapAction>>,
    pub weapon: Weapon,
    plan: Option<Plan>,
    plan_index: usize,
    run: ActionRun,
    replan_cooldown: FixedNum,
    did_attack: bool,
    had_line_of_sight: bool,
    clockwise: bool,
    world_state: WorldState,
    last_failure: Option<PlanError>,
    replans: u32,
}

impl GoapAgent {
    pub fn new(settings: &GoapSettings) -> Self {
        Self::with_library(settings, default_library())
    }

    pub fn with_library(settings: &GoapSettings, library: Vec<Arc<dyn GoapAction>>) -> Self {
        Self {
            library,
            weapon: Weapon::new(settings.fire_cooldown),
            plan: None,
            plan_index: 0,
            run: ActionRun::default(),
            replan_cooldown: FixedNum::ZERO,
            did_attack: false,
            had_line_of_sight: false,
            clockwise: false,
            world_state: WorldState::default(),
            last_failure: None,
            replans: 0,
        }
    }

    /// Orbit direction used by kiting actions.
    pub fn with_clockwise(mut self, clockwise: bool) -> Self {
        self.clockwise = clockwise;
        self
    }

    // ------------------------------------------------------------------
    // Telemetry
    // ------------------------------------------------------------------

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn plan_index(&self) -> usize {
        self.plan_index
    }

    pub fn current_action_name(&self) -> Option<&'static str> {
        self.plan
            .as_ref()
            .and_then(|p| p.step(self.plan_index))
            .map(|a| a.name())
    }

    pub fn world_state(&self) -> WorldState {
        self.world_state
    }

    pub fn last_failure(&self) -> Option<PlanError> {
        self.last_failure
    }

    pub fn replan_count(&self) -> u32 {
        self.replans
    }

    // ------------------------------------------------------------------

    pub fn sense(&self, sense: &GoapSense, settings: &GoapSettings) -> WorldState {
        let distance_band = match sense.target {
            Some(_) => settings.bands.classify(sense.distance),
            None => Default::default(),
        };
        WorldState {
            has_line_of_sight: sense.target.is_some() && sense.line_of_sight,
            weapon_ready: self.weapon.is_ready(),
            low_health: sense.health_fraction <= settings.low_health_fraction,
            distance_band,
            did_attack: self.did_attack,
        }
    }

    fn plan_is_live(&self) -> bool {
        self.plan.as_ref().is_some_and(|p| self.plan_index < p.len())
    }

    fn drop_plan(&mut self) {
        self.plan = None;
        self.plan_index = 0;
        self.run = ActionRun::default();
    }

    fn replan(&mut self, settings: &GoapSettings) {
        self.did_attack = false;
        self.world_state.did_attack = false;
        self.replan_cooldown = settings.replan_cooldown;
        self.replans += 1;
        self.plan_index = 0;
        self.run = ActionRun::default();

        match plan(self.world_state, &self.library) {
            Ok(found) => {
                debug!("[GOAP] New plan {:?} from {:?}", found.names(), self.world_state);
                self.last_failure = None;
                self.plan = Some(found);
            }
            Err(err) => {
                debug!("[GOAP] Planning failed: {}", err);
                self.last_failure = Some(err);
                self.plan = None;
            }
        }
    }

    /// Advance the executor by one tick.
    pub fn tick(&mut self, sense: &GoapSense, position: FixedVec2, dt: FixedNum, settings: &GoapSettings) -> GoapOutput {
        self.weapon.tick(dt);
        self.replan_cooldown = (self.replan_cooldown - dt).max(FixedNum::ZERO);
        self.world_state = self.sense(sense, settings);

        let lost_sight = self.had_line_of_sight && !self.world_state.has_line_of_sight;
        self.had_line_of_sight = self.world_state.has_line_of_sight;
        if lost_sight && self.plan_is_live() && self.plan_index > 0 {
            debug!("[GOAP] Line of sight lost at step {}; dropping plan", self.plan_index);
            self.drop_plan();
        }

        if !self.plan_is_live() {
            if self.replan_cooldown > FixedNum::ZERO {
                return GoapOutput::default();
            }
            self.replan(settings);
            if !self.plan_is_live() {
                return GoapOutput::default();
            }
        }

        let Some(action) = self.plan.as_ref().and_then(|p| p.step(self.plan_index)).cloned() else {
            return GoapOutput::default();
        };

        if self.run.phase() == RunPhase::NotStarted && !action.precondition(&self.world_state) {
            debug!("[GOAP] {} no longer applicable; dropping plan", action.name());
            self.drop_plan();
            return GoapOutput::default();
        }

        let mut ctx = ActionContext {
            dt,
            position,
            target: sense.target,
            distance: sense.distance,
            line_of_sight: self.world_state.has_line_of_sight,
            clear_shot: sense.clear_shot,
            settings,
            weapon: &mut self.weapon,
            clockwise: self.clockwise,
            motion: MotionOrder::Hold,
            fired: None,
        };
        let status = self.run.resume(action.as_ref(), &mut ctx);
        let output = GoapOutput {
            motion: ctx.motion,
            fired: ctx.fired,
        };

        if output.fired.is_some() {
            self.did_attack = true;
            self.world_state.did_attack = true;
        }
        if status.is_finished() {
            if status != TaskStatus::Done {
                debug!("[GOAP] {} finished with {:?}", action.name(), status);
            }
            self.plan_index += 1;
            self.run = ActionRun::default();
        }
        output
    }
}
