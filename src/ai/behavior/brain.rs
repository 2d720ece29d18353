use bevy::prelude::*;
use rand::rngs::StdRng;

use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::pathfinding::PathFollower;
use crate::ai::simulation::{AgentId, AttackKind, Perception, RangeProfile};
use crate::ai::spatial::{Occupancy, VisibilityCache};
use crate::ai::squad::{MateSnapshot, SquadRegistry};
use crate::ai::targeting::TargetId;

use super::attack::AttackStrategy;
use super::chase::ChaseStrategy;
use super::idle::IdleStrategy;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BehaviorState {
    #[default]
    Idle,
    Chase,
    Attack,
}

/// Everything a strategy may read or touch during one agent's tick.
pub struct BrainContext<'a> {
    pub agent: AgentId,
    pub dt: FixedNum,
    pub tick: u64,
    pub position: FixedVec2,
    pub home: Option<FixedVec2>,
    pub ranges: RangeProfile,
    pub perception: Perception,
    pub obstacles: &'a dyn Occupancy,
    pub rng: &'a mut StdRng,
    pub squads: &'a mut SquadRegistry,
    pub visibility: &'a mut VisibilityCache,
    pub follower: &'a mut PathFollower,
    /// Squad-mates as of the previous tick.
    pub mates: &'a MateSnapshot,
}

/// Per-tick result of an [`EnemyBrain`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrainOutput {
    pub velocity: FixedVec2,
    pub attack: Option<(TargetId, AttackKind)>,
    pub attack_ready: bool,
    pub can_move: bool,
}

/// Idle / Chase / Attack state machine hosting one strategy per state.
#[derive(Component, Clone, Debug)]
pub struct EnemyBrain {
    state: BehaviorState,
    pub idle: IdleStrategy,
    pub chase: ChaseStrategy,
    pub attack: AttackStrategy,
    attack_ready: bool,
    transitions: u32,
}

impl EnemyBrain {
    pub fn new(idle: IdleStrategy, chase: ChaseStrategy, attack: AttackStrategy) -> Self {
        Self {
            state: BehaviorState::Idle,
            idle,
            chase,
            attack,
            attack_ready: false,
            transitions: 0,
        }
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    /// Whether the attack strategy could land a hit right now.
    pub fn attack_ready(&self) -> bool {
        self.attack_ready
    }

    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    pub fn label(&self) -> &'static str {
        match self.state {
            BehaviorState::Idle => self.idle.label(),
            BehaviorState::Chase => self.chase.label(),
            BehaviorState::Attack => self.attack.label(),
        }
    }

    pub fn target_destroyed(&mut self, target: TargetId) {
        self.chase.target_destroyed(target);
        self.attack.target_destroyed(target);
    }

    fn transition(&mut self, next: BehaviorState, ctx: &mut BrainContext) {
        if next == self.state {
            return;
        }
        match self.state {
            BehaviorState::Idle => {}
            BehaviorState::Chase => self.chase.exit(ctx),
            BehaviorState::Attack => self.attack.exit(ctx),
        }
        debug!("[BEHAVIOR] {:?}: {:?} -> {:?}", ctx.agent, self.state, next);
        self.state = next;
        self.transitions += 1;
        match next {
            BehaviorState::Idle => self.idle.enter(),
            BehaviorState::Chase => self.chase.enter(ctx),
            BehaviorState::Attack => self.attack.enter(),
        }
    }

    fn next_state(&mut self, ctx: &BrainContext) -> BehaviorState {
        let perception = &ctx.perception;
        if perception.target.is_none() {
            return BehaviorState::Idle;
        }
        let state = self.state;
        match state {
            BehaviorState::Idle if perception.within(ctx.ranges.aggro_range()) => BehaviorState::Chase,
            BehaviorState::Chase
                if self.chase.yields_to_attack()
                    && (perception.within(ctx.ranges.attack_range()) || self.chase.can_strike()) =>
            {
                BehaviorState::Attack
            }
            BehaviorState::Attack if self.attack.update_exit(ctx) => BehaviorState::Chase,
            state => state,
        }
    }

    /// Run transitions, then the active strategy.
    pub fn tick(&mut self, ctx: &mut BrainContext) -> BrainOutput {
        let next = self.next_state(ctx);
        self.transition(next, ctx);

        let home = ctx.home.unwrap_or(ctx.position);
        let mut output = BrainOutput {
            can_move: true,
            ..Default::default()
        };
        match self.state {
            BehaviorState::Idle => {
                output.velocity = self.idle.tick(ctx.position, home, &mut *ctx.rng);
            }
            BehaviorState::Chase => {
                output.velocity = self.chase.tick(ctx);
            }
            BehaviorState::Attack => {
                let tick = self.attack.tick(ctx);
                output.velocity = tick.velocity;
                output.attack_ready = tick.attack_ready;
                output.can_move = !tick.rooted;
                output.attack = tick
                    .attack
                    .zip(ctx.perception.target)
                    .map(|(kind, target)| (target.id, kind));
            }
        }
        self.attack_ready = output.attack_ready;
        output
    }
}
