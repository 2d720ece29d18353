//! Spawn helpers for agents and targets.

use std::f64::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use crate::ai::behavior::{AttackStrategy, ChaseStrategy, EnemyBrain, IdleStrategy};
use crate::ai::config::AiConfig;
use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::goap::GoapAgent;
use crate::ai::pathfinding::PathFollower;
use crate::ai::simulation::{
    ActionLabel, AgentId, AgentIdAllocator, AnimationFlags, DesiredVelocity, Health, HomePosition, Mobility,
    Perception, SimPosition, SimVelocity,
};
use crate::ai::squad::GatherAttack;
use crate::ai::targeting::{Target, TargetId};

/// Stock enemy loadouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyArchetype {
    /// Wanders, runs straight in, then gathers around the target with its squad.
    Flocker,
    /// Paths toward the target while it is visible, searches where it was last seen.
    Tracker,
    /// Breadcrumbs through the visibility grid, then shoots.
    Skirmisher,
    /// Runs straight in and swings.
    Brute,
    /// Wanders until something comes close, then backs away from it.
    Skittish,
}

impl EnemyArchetype {
    pub fn brain(self, config: &AiConfig) -> EnemyBrain {
        let chase = &config.chase;
        let attack = &config.attack;
        match self {
            Self::Flocker => EnemyBrain::new(
                IdleStrategy::wander(config.wander),
                ChaseStrategy::direct(chase.direct_speed),
                AttackStrategy::GatherAround(GatherAttack::new(config.gather)),
            ),
            Self::Tracker => EnemyBrain::new(
                IdleStrategy::wander(config.wander),
                ChaseStrategy::line_of_sight(chase.line_of_sight),
                AttackStrategy::melee(attack.melee),
            ),
            Self::Skirmisher => EnemyBrain::new(
                IdleStrategy::StandStill,
                ChaseStrategy::dot_grid(chase.dot_grid),
                AttackStrategy::projectile(attack.projectile),
            ),
            Self::Brute => EnemyBrain::new(
                IdleStrategy::StandStill,
                ChaseStrategy::direct(chase.direct_speed),
                AttackStrategy::melee(attack.melee),
            ),
            Self::Skittish => EnemyBrain::new(
                IdleStrategy::wander(config.wander),
                ChaseStrategy::runaway(chase.runaway_speed),
                AttackStrategy::melee(attack.melee),
            ),
        }
    }
}

/// Motion, health and sensing shared by every agent kind.
fn agent_base(id: AgentId, position: FixedVec2, config: &AiConfig) -> impl Bundle {
    (
        id,
        SimPosition(position),
        SimVelocity::default(),
        DesiredVelocity::default(),
        HomePosition(position),
        Mobility::default(),
        Health::new(config.max_health),
        config.ranges,
        Perception::default(),
        PathFollower::new(config.follower),
        ActionLabel::default(),
    )
}

pub fn enemy_bundle(id: AgentId, position: FixedVec2, config: &AiConfig, archetype: EnemyArchetype) -> impl Bundle {
    (
        agent_base(id, position, config),
        archetype.brain(config),
        AnimationFlags::default(),
    )
}

pub fn goap_bundle(id: AgentId, position: FixedVec2, config: &AiConfig, clockwise: bool) -> impl Bundle {
    (
        agent_base(id, position, config),
        GoapAgent::new(&config.goap).with_clockwise(clockwise),
    )
}

pub fn target_bundle(id: TargetId, position: FixedVec2, max_health: FixedNum) -> impl Bundle {
    (
        Target { id },
        SimPosition(position),
        SimVelocity::default(),
        Health::new(max_health),
    )
}

/// `count` points uniformly distributed over the disc of `radius` around
/// `center`.
pub fn scatter_positions<R: Rng>(center: FixedVec2, radius: FixedNum, count: usize, rng: &mut R) -> Vec<FixedVec2> {
    let radius = radius.to_num::<f64>().max(0.0);
    (0..count)
        .map(|_| {
            let angle = rng.random_range(0.0..TAU);
            let r = radius * rng.random::<f64>().sqrt();
            center + FixedVec2::new(FixedNum::from_num(r * angle.cos()), FixedNum::from_num(r * angle.sin()))
        })
        .collect()
}

/// Spawn a group of enemies scattered around `center`, ids in spawn order.
#[allow(clippy::too_many_arguments)]
pub fn spawn_enemy_group<R: Rng>(
    commands: &mut Commands,
    ids: &mut AgentIdAllocator,
    rng: &mut R,
    config: &AiConfig,
    center: FixedVec2,
    radius: FixedNum,
    count: usize,
    archetype: EnemyArchetype,
) -> Vec<Entity> {
    let spawned: Vec<Entity> = scatter_positions(center, radius, count, rng)
        .into_iter()
        .map(|position| commands.spawn(enemy_bundle(ids.allocate(), position, config, archetype)).id())
        .collect();
    info!(
        "[BEHAVIOR] Spawned {} {:?} enemies around ({}, {})",
        spawned.len(),
        archetype,
        center.x,
        center.y
    );
    spawned
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::ai::fixed_math::fx;

    #[test]
    fn scatter_stays_inside_the_disc() {
        let mut rng = StdRng::seed_from_u64(3);
        let center = FixedVec2::new(fx(10.0), fx(-4.0));
        let points = scatter_positions(center, fx(2.0), 500, &mut rng);
        assert_eq!(points.len(), 500);
        assert!(points.iter().all(|p| p.distance(center) <= fx(2.0) + fx(0.001)));
        // Uniform over area: roughly a quarter land inside half the radius.
        let inner = points.iter().filter(|p| p.distance(center) <= fx(1.0)).count();
        assert!((75..=175).contains(&inner), "inner count {inner}");
    }

    #[test]
    fn scatter_is_reproducible() {
        let a = scatter_positions(FixedVec2::ZERO, fx(3.0), 20, &mut StdRng::seed_from_u64(9));
        let b = scatter_positions(FixedVec2::ZERO, fx(3.0), 20, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn enemy_bundle_carries_archetype_strategies() {
        let config = AiConfig::default();
        let mut world = World::new();
        let entity = world
            .spawn(enemy_bundle(AgentId(4), fx_vec(1.0, 2.0), &config, EnemyArchetype::Skirmisher))
            .id();

        let brain = world.get::<EnemyBrain>(entity).unwrap();
        assert_eq!(brain.label(), "Idle");
        assert!(matches!(brain.chase, ChaseStrategy::PathDotGrid { .. }));
        assert!(matches!(brain.attack, AttackStrategy::Projectile { .. }));
        assert_eq!(world.get::<HomePosition>(entity).unwrap().0, fx_vec(1.0, 2.0));
        assert_eq!(world.get::<Health>(entity).unwrap().current, config.max_health);
    }

    fn fx_vec(x: f64, y: f64) -> FixedVec2 {
        FixedVec2::new(fx(x), fx(y))
    }
}
