//! Minimal combat collaborator: turns attack intents into damage.
//!
//! Melee intents land immediately when the target is still within reach.
//! Projectile intents spawn an entity that flies in a straight line until it
//! hits a target, runs into an obstacle or expires. Targets and agents that
//! reach zero health are despawned and announced.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::ai::config::AiConfig;
use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::simulation::{
    AgentDespawned, AgentId, AttackIntent, AttackKind, Health, SimPosition, SimVelocity, TargetDestroyed,
};
use crate::ai::spatial::shapes::closest_point_on_segment;
use crate::ai::spatial::{ObstacleLayer, Occupancy};
use crate::ai::targeting::{Target, TargetId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatSettings {
    /// Seconds a projectile flies before it is discarded.
    pub projectile_lifetime: FixedNum,
    pub projectile_hit_radius: FixedNum,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            projectile_lifetime: FixedNum::from_num(5),
            projectile_hit_radius: FixedNum::from_num(0.3),
        }
    }
}

/// A shot in flight. Position and velocity live in the usual motion
/// components; `DesiredVelocity` is absent so the agent integrator skips it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    pub owner: AgentId,
    pub aimed_at: TargetId,
    pub damage: FixedNum,
    pub remaining: FixedNum,
}

// ============================================================================
// Projectiles
// ============================================================================

pub fn spawn_projectiles(mut commands: Commands, config: Res<AiConfig>, mut intents: MessageReader<AttackIntent>) {
    for intent in intents.read() {
        let AttackKind::Projectile {
            origin,
            direction,
            speed,
            damage,
        } = intent.kind
        else {
            continue;
        };
        commands.spawn((
            Projectile {
                owner: intent.attacker,
                aimed_at: intent.target,
                damage,
                remaining: config.combat.projectile_lifetime,
            },
            SimPosition(origin),
            SimVelocity(direction * speed),
        ));
        debug!("[COMBAT] {:?} fired at {:?}", intent.attacker, intent.target);
    }
}

/// Move every projectile one step and resolve what it touched on the way.
///
/// Any living target counts, not only the one aimed at; the nearest to the
/// segment start wins. A shot that clips an obstacle is absorbed.
pub fn advance_projectiles(
    mut commands: Commands,
    config: Res<AiConfig>,
    obstacles: Option<Res<ObstacleLayer>>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut SimPosition, &SimVelocity)>,
    mut targets: Query<(Entity, &Target, &SimPosition, &mut Health), Without<Projectile>>,
) {
    let layer = obstacles.as_deref();
    let dt = config.dt;
    let hit_radius_sq = config.combat.projectile_hit_radius * config.combat.projectile_hit_radius;

    let mut victims: Vec<(TargetId, Entity, FixedVec2, bool)> = targets
        .iter()
        .map(|(entity, target, position, health)| (target.id, entity, position.0, health.is_alive()))
        .collect();
    victims.sort_by_key(|(id, ..)| *id);

    let mut ordered: Vec<_> = projectiles.iter_mut().collect();
    ordered.sort_by_key(|(entity, ..)| *entity);

    for (entity, mut projectile, mut position, velocity) in ordered {
        let from = position.0;
        let to = from + velocity.0 * dt;

        let hit = victims
            .iter_mut()
            .filter(|(_, _, at, alive)| {
                *alive && closest_point_on_segment(from, to, *at).distance_squared(*at) <= hit_radius_sq
            })
            .min_by_key(|(id, _, at, _)| (at.distance_squared(from), *id));

        if let Some((id, victim, _, alive)) = hit {
            if let Ok((_, _, _, mut health)) = targets.get_mut(*victim) {
                health.apply_damage(projectile.damage);
                *alive = health.is_alive();
                debug!(
                    "[COMBAT] Projectile from {:?} hit {:?} ({} left)",
                    projectile.owner, id, health.current
                );
            }
            commands.entity(entity).despawn();
            continue;
        }

        if layer.segment_blocked(from, to) {
            commands.entity(entity).despawn();
            continue;
        }

        projectile.remaining -= dt;
        if projectile.remaining <= FixedNum::ZERO {
            commands.entity(entity).despawn();
            continue;
        }
        position.0 = to;
    }
}

// ============================================================================
// Melee
// ============================================================================

/// Land melee intents whose target is still within reach of the attacker.
pub fn apply_melee_intents(
    mut intents: MessageReader<AttackIntent>,
    attackers: Query<(&AgentId, &SimPosition)>,
    mut targets: Query<(Entity, &Target, &SimPosition, &mut Health)>,
) {
    let attacker_positions: BTreeMap<AgentId, FixedVec2> = attackers.iter().map(|(id, p)| (*id, p.0)).collect();
    let target_entities: BTreeMap<TargetId, Entity> = targets.iter().map(|(e, t, ..)| (t.id, e)).collect();

    for intent in intents.read() {
        let AttackKind::Melee { damage, range } = intent.kind else {
            continue;
        };
        let Some(from) = attacker_positions.get(&intent.attacker) else {
            continue;
        };
        let Some(entity) = target_entities.get(&intent.target) else {
            continue;
        };
        let Ok((_, _, position, mut health)) = targets.get_mut(*entity) else {
            continue;
        };
        if !health.is_alive() || from.distance(position.0) > range {
            continue;
        }
        health.apply_damage(damage);
        debug!(
            "[COMBAT] {:?} struck {:?} for {} ({} left)",
            intent.attacker, intent.target, damage, health.current
        );
    }
}

// ============================================================================
// Death
// ============================================================================

pub fn reap_dead_targets(
    mut commands: Commands,
    targets: Query<(Entity, &Target, &Health)>,
    mut destroyed: MessageWriter<TargetDestroyed>,
) {
    let mut dead: Vec<_> = targets
        .iter()
        .filter(|(_, _, health)| !health.is_alive())
        .map(|(entity, target, _)| (target.id, entity))
        .collect();
    dead.sort_by_key(|(id, _)| *id);

    for (id, entity) in dead {
        commands.entity(entity).despawn();
        destroyed.write(TargetDestroyed { target: id });
        info!("[COMBAT] {:?} destroyed", id);
    }
}

pub fn reap_dead_agents(
    mut commands: Commands,
    agents: Query<(Entity, &AgentId, &Health)>,
    mut despawned: MessageWriter<AgentDespawned>,
) {
    let mut dead: Vec<_> = agents
        .iter()
        .filter(|(_, _, health)| !health.is_alive())
        .map(|(entity, id, _)| (*id, entity))
        .collect();
    dead.sort_by_key(|(id, _)| *id);

    for (id, entity) in dead {
        commands.entity(entity).despawn();
        despawned.write(AgentDespawned { agent: id });
        info!("[COMBAT] {:?} died", id);
    }
}
