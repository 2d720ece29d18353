//! Attack strategies and the intents they emit.

use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::simulation::AttackKind;
use crate::ai::squad::{GatherAttack, GatherInput};
use crate::ai::targeting::TargetId;

use super::BrainContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectileSettings {
    pub interval: FixedNum,
    /// Beyond this distance the exit timer runs.
    pub exit_distance: FixedNum,
    pub exit_time: FixedNum,
    pub speed: FixedNum,
    pub damage: FixedNum,
    /// `Some(1)` for a single shot per engagement, `None` to keep firing.
    pub shot_limit: Option<u32>,
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            interval: FixedNum::from_num(1),
            exit_distance: FixedNum::from_num(3),
            exit_time: FixedNum::from_num(2),
            speed: FixedNum::from_num(5),
            damage: FixedNum::from_num(10),
            shot_limit: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeleeSettings {
    pub interval: FixedNum,
    pub range: FixedNum,
    pub damage: FixedNum,
}

impl Default for MeleeSettings {
    fn default() -> Self {
        Self {
            interval: FixedNum::from_num(1),
            range: FixedNum::from_num(1.5),
            damage: FixedNum::from_num(15),
        }
    }
}

/// Result of one attack tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackTick {
    pub velocity: FixedVec2,
    pub attack: Option<AttackKind>,
    pub attack_ready: bool,
    /// The agent must not move this tick.
    pub rooted: bool,
}

/// How an agent fights once in range.
#[derive(Clone, Debug, PartialEq)]
pub enum AttackStrategy {
    /// Surround the target with squad-mates and strike from the ring.
    GatherAround(GatherAttack),
    /// Stand and shoot on a timer.
    Projectile {
        settings: ProjectileSettings,
        timer: FixedNum,
        beyond_for: FixedNum,
        shots: u32,
    },
    /// Rooted melee swings on a timer.
    MeleeSwing { settings: MeleeSettings, timer: FixedNum },
}

impl AttackStrategy {
    pub fn projectile(settings: ProjectileSettings) -> Self {
        Self::Projectile {
            settings,
            timer: FixedNum::ZERO,
            beyond_for: FixedNum::ZERO,
            shots: 0,
        }
    }

    pub fn melee(settings: MeleeSettings) -> Self {
        Self::MeleeSwing {
            settings,
            timer: FixedNum::ZERO,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::GatherAround(_) => "Gather",
            Self::Projectile { .. } => "Shoot",
            Self::MeleeSwing { .. } => "Swing",
        }
    }

    pub fn gather(&self) -> Option<&GatherAttack> {
        match self {
            Self::GatherAround(gather) => Some(gather),
            _ => None,
        }
    }

    pub fn enter(&mut self) {
        match self {
            Self::GatherAround(gather) => gather.enter(),
            Self::Projectile {
                timer,
                beyond_for,
                shots,
                ..
            } => {
                *timer = FixedNum::ZERO;
                *beyond_for = FixedNum::ZERO;
                *shots = 0;
            }
            Self::MeleeSwing { timer, .. } => *timer = FixedNum::ZERO,
        }
    }

    pub fn exit(&mut self, ctx: &mut BrainContext) {
        if let Self::GatherAround(gather) = self {
            gather.exit(ctx.agent, ctx.squads);
        }
    }

    pub fn target_destroyed(&mut self, target: TargetId) {
        if let Self::GatherAround(gather) = self {
            if gather.joined_target() == Some(target) {
                gather.disband();
            }
        }
    }

    /// Whether the target has left this strategy's range. Call once per tick
    /// before [`tick`](Self::tick); the projectile variant accumulates its
    /// exit timer here.
    pub fn update_exit(&mut self, ctx: &BrainContext) -> bool {
        let distance = ctx.perception.distance;
        match self {
            Self::GatherAround(gather) => {
                let settings = &gather.settings;
                let hold = ctx.ranges.attack_range().max(settings.ring.sanitized().desired_radius)
                    + settings.flock.slot_arrival_threshold;
                distance > hold
            }
            Self::Projectile {
                settings, beyond_for, ..
            } => {
                if distance > settings.exit_distance {
                    *beyond_for += ctx.dt;
                } else {
                    *beyond_for = FixedNum::ZERO;
                }
                *beyond_for >= settings.exit_time
            }
            Self::MeleeSwing { settings, .. } => distance > settings.range,
        }
    }

    pub fn tick(&mut self, ctx: &mut BrainContext) -> AttackTick {
        let Some(target) = ctx.perception.target else {
            return AttackTick::default();
        };
        match self {
            Self::GatherAround(gather) => {
                let out = gather.tick(
                    ctx.squads,
                    GatherInput {
                        agent: ctx.agent,
                        position: ctx.position,
                        target: Some((target.id, target.position)),
                        mates: ctx.mates,
                        dt: ctx.dt,
                    },
                );
                let attack = out.strike.then(|| AttackKind::Melee {
                    damage: gather.settings.attack_damage,
                    range: gather.settings.attack_range(),
                });
                AttackTick {
                    velocity: out.velocity,
                    attack,
                    attack_ready: out.attack_ready,
                    rooted: false,
                }
            }
            Self::Projectile {
                settings, timer, shots, ..
            } => {
                *timer = (*timer - ctx.dt).max(FixedNum::ZERO);
                let allowed = settings.shot_limit.is_none_or(|limit| *shots < limit);
                let ready = allowed && *timer == FixedNum::ZERO;
                let direction = (target.position - ctx.position).normalize();
                let mut attack = None;
                if ready && !direction.is_zero() {
                    attack = Some(AttackKind::Projectile {
                        origin: ctx.position,
                        direction,
                        speed: settings.speed,
                        damage: settings.damage,
                    });
                    *timer = settings.interval;
                    *shots += 1;
                }
                AttackTick {
                    velocity: FixedVec2::ZERO,
                    attack,
                    attack_ready: ready,
                    rooted: false,
                }
            }
            Self::MeleeSwing { settings, timer } => {
                *timer = (*timer - ctx.dt).max(FixedNum::ZERO);
                let ready = *timer == FixedNum::ZERO;
                let mut attack = None;
                if ready && ctx.perception.distance <= settings.range {
                    attack = Some(AttackKind::Melee {
                        damage: settings.damage,
                        range: settings.range,
                    });
                    *timer = settings.interval;
                }
                AttackTick {
                    velocity: FixedVec2::ZERO,
                    attack,
                    attack_ready: ready,
                    rooted: true,
                }
            }
        }
    }
}
