use super::flocking::{FlockSettings, MateSnapshot, SteeringTerms};
use super::formation::{slot_target, RingFormation, RingSettings};
use super::registry::SquadRegistry;
use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::simulation::AgentId;
use crate::ai::targeting::TargetId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GatherSettings {
    pub ring: RingSettings,
    pub flock: FlockSettings,
    pub attack_damage: FixedNum,
    pub attack_cooldown: FixedNum,
    /// Reach beyond the minimum ring radius at which strikes land.
    pub attack_range_bonus: FixedNum,
}

impl Default for GatherSettings {
    fn default() -> Self {
        Self {
            ring: RingSettings::default(),
            flock: FlockSettings::default(),
            attack_damage: FixedNum::from_num(10),
            attack_cooldown: FixedNum::from_num(0.8),
            attack_range_bonus: FixedNum::from_num(0.3),
        }
    }
}

impl GatherSettings {
    pub fn attack_range(&self) -> FixedNum {
        self.ring.sanitized().min_radius + self.attack_range_bonus
    }
}

/// One agent's inputs for a flocking tick.
#[derive(Clone, Copy, Debug)]
pub struct GatherInput<'a> {
    pub agent: AgentId,
    pub position: FixedVec2,
    pub target: Option<(TargetId, FixedVec2)>,
    pub mates: &'a MateSnapshot,
    pub dt: FixedNum,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GatherOutput {
    pub velocity: FixedVec2,
    /// Standing in the assigned slot.
    pub attack_ready: bool,
    /// Cooldown elapsed while ready and within reach: apply damage now.
    pub strike: bool,
}

/// Per-agent state of the ring-formation attack.
#[derive(Clone, Debug, PartialEq)]
pub struct GatherAttack {
    pub settings: GatherSettings,
    ring: RingFormation,
    joined: Option<TargetId>,
    cooldown: FixedNum,
    slot_index: Option<usize>,
    slot_target: Option<FixedVec2>,
}

impl GatherAttack {
    pub fn new(settings: GatherSettings) -> Self {
        Self {
            ring: RingFormation::new(&settings.ring),
            settings,
            joined: None,
            cooldown: FixedNum::ZERO,
            slot_index: None,
            slot_target: None,
        }
    }

    pub fn ring_radius(&self) -> FixedNum {
        self.ring.radius()
    }

    pub fn slot_index(&self) -> Option<usize> {
        self.slot_index
    }

    pub fn slot_target(&self) -> Option<FixedVec2> {
        self.slot_target
    }

    pub fn joined_target(&self) -> Option<TargetId> {
        self.joined
    }

    /// Fresh engagement: ring back at the desired radius.
    pub fn enter(&mut self) {
        self.ring.reset(&self.settings.ring);
        self.cooldown = FixedNum::ZERO;
    }

    pub fn exit(&mut self, agent: AgentId, squads: &mut SquadRegistry) {
        self.leave_squad(agent, squads);
    }

    /// Forget the squad without touching the registry (it already dropped us).
    pub fn disband(&mut self) {
        self.joined = None;
        self.slot_index = None;
        self.slot_target = None;
    }

    fn leave_squad(&mut self, agent: AgentId, squads: &mut SquadRegistry) {
        if let Some(previous) = self.joined.take() {
            squads.leave(previous, agent);
        }
        self.slot_index = None;
        self.slot_target = None;
    }

    pub fn tick(&mut self, squads: &mut SquadRegistry, input: GatherInput<'_>) -> GatherOutput {
        self.cooldown = (self.cooldown - input.dt).max(FixedNum::ZERO);

        let Some((target, target_position)) = input.target else {
            self.leave_squad(input.agent, squads);
            return GatherOutput::default();
        };

        if self.joined != Some(target) {
            self.leave_squad(input.agent, squads);
            squads.join(target, input.agent);
            self.joined = Some(target);
        }

        let radius = self.ring.ease(&self.settings.ring, input.dt);
        let index = squads.slot_of(target, input.agent);
        let size = squads.squad_size(target).max(1);
        let slot = slot_target(target_position, size, index, radius);
        self.slot_index = Some(index);
        self.slot_target = Some(slot);

        let flock = &self.settings.flock;
        if input.position.distance(slot) > flock.slot_arrival_threshold {
            let members = squads.squad(target).map(|s| s.members()).unwrap_or(&[]);
            let mates = members.iter().filter_map(|id| input.mates.get(id));
            let terms = SteeringTerms::compute(input.agent, input.position, mates, slot, radius, flock);
            return GatherOutput {
                velocity: terms.combine(flock),
                attack_ready: false,
                strike: false,
            };
        }

        let in_reach = input.position.distance(target_position) <= self.settings.attack_range();
        let strike = in_reach && self.cooldown == FixedNum::ZERO;
        if strike {
            self.cooldown = self.settings.attack_cooldown;
        }
        GatherOutput {
            velocity: FixedVec2::ZERO,
            attack_ready: true,
            strike,
        }
    }
}
