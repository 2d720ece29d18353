use std::sync::Arc;

use thiserror::Error;

use crate::ai::fixed_math::FixedNum;

use super::action::GoapAction;
use super::world_state::WorldState;

/// Hard cap on plan length; greedy search can otherwise cycle forever.
pub const MAX_PLAN_STEPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("no applicable action at step {step} from {state:?}")]
    NoApplicableAction { step: usize, state: WorldState },
    #[error("goal not reached within {bound} steps (stopped at {state:?})")]
    StepBoundExhausted { bound: usize, state: WorldState },
}

/// An ordered sequence of actions and the state it is expected to reach.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    steps: Vec<Arc<dyn GoapAction>>,
    expected: WorldState,
    cost: FixedNum,
}

impl Plan {
    pub fn steps(&self) -> &[Arc<dyn GoapAction>] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Arc<dyn GoapAction>> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|a| a.name()).collect()
    }

    /// Simulated state after every step has applied its effects.
    pub fn expected_state(&self) -> WorldState {
        self.expected
    }

    pub fn cost(&self) -> FixedNum {
        self.cost
    }
}

/// Greedy forward search from `initial` toward the goal.
///
/// Each step takes the applicable action whose effects leave the fewest
/// unsatisfied goal facts, cheaper first, then library order.
pub fn plan(initial: WorldState, library: &[Arc<dyn GoapAction>]) -> Result<Plan, PlanError> {
    let mut state = initial;
    let mut steps: Vec<Arc<dyn GoapAction>> = Vec::new();
    let mut cost = FixedNum::ZERO;

    if state.satisfies_goal() {
        return Ok(Plan {
            steps,
            expected: state,
            cost,
        });
    }

    for step in 0..MAX_PLAN_STEPS {
        let best = library
            .iter()
            .filter(|action| action.precondition(&state))
            .map(|action| (action, action.apply_effects(state)))
            .min_by_key(|(action, next)| (next.unsatisfied_goal_facts(), action.cost()));

        let Some((action, next)) = best else {
            return Err(PlanError::NoApplicableAction { step, state });
        };

        cost += action.cost();
        steps.push(Arc::clone(action));
        state = next;

        if state.satisfies_goal() {
            steps.dedup_by(|a, b| a.name() == b.name());
            return Ok(Plan {
                steps,
                expected: state,
                cost,
            });
        }
    }

    Err(PlanError::StepBoundExhausted {
        bound: MAX_PLAN_STEPS,
        state,
    })
}
