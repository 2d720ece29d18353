use bevy::prelude::*;
use skirmish_macros::profile;

use super::action::MotionOrder;
use super::executor::{GoapAgent, GoapSense};
use crate::ai::config::AiConfig;
use crate::ai::fixed_math::FixedVec2;
use crate::ai::pathfinding::{orbit_direction, steer_with_avoidance, PathFollower};
use crate::ai::simulation::{
    ActionLabel, AgentId, AiRng, AttackIntent, AttackKind, DesiredVelocity, Health, Perception, SimPosition, SimTick,
    SimVelocity,
};
use crate::ai::spatial::ObstacleLayer;

/// Tick every GOAP agent in id order and translate its motion order into a
/// desired velocity.
#[profile(2)]
pub fn run_goap_agents(
    #[allow(unused_variables)] tick: Res<SimTick>,
    config: Res<AiConfig>,
    obstacles: Option<Res<ObstacleLayer>>,
    mut rng: ResMut<AiRng>,
    mut intents: MessageWriter<AttackIntent>,
    mut agents: Query<(
        &AgentId,
        &SimPosition,
        &SimVelocity,
        &Perception,
        &Health,
        &mut GoapAgent,
        &mut PathFollower,
        &mut DesiredVelocity,
        &mut ActionLabel,
    )>,
) {
    let layer = obstacles.as_deref();
    let settings = &config.goap;
    let dt = config.dt;

    let mut ordered: Vec<_> = agents.iter_mut().collect();
    ordered.sort_by_key(|(id, ..)| **id);

    #[allow(unused_variables, unused_mut)]
    let mut shots = 0usize;
    for (id, position, velocity, perception, health, mut agent, mut follower, mut desired, mut label) in ordered {
        let sense = GoapSense {
            target: perception.target,
            distance: perception.distance,
            line_of_sight: perception.line_of_sight,
            clear_shot: perception.clear_shot,
            health_fraction: health.fraction(),
        };
        let output = agent.tick(&sense, position.0, dt, settings);

        desired.0 = match (output.motion, perception.target) {
            (MotionOrder::Pursue, Some(target)) => {
                follower.set_goal(target.position);
                follower.tick(position.0, dt, &layer, &mut rng.0).normalize() * settings.move_speed
            }
            (MotionOrder::Orbit { radius, clockwise }, Some(target)) => {
                follower.clear_goal();
                let orbit = orbit_direction(
                    position.0,
                    velocity.0,
                    target.position,
                    radius,
                    clockwise,
                    &settings.orbit,
                    settings.max_radial_speed,
                );
                let speed = orbit.length().min(settings.move_speed);
                steer_with_avoidance(position.0, orbit, &config.follower.avoidance, &layer, &mut rng.0) * speed
            }
            _ => {
                follower.clear_goal();
                FixedVec2::ZERO
            }
        };

        if let (Some(direction), Some(target)) = (output.fired, perception.target) {
            intents.write(AttackIntent {
                attacker: *id,
                target: target.id,
                kind: AttackKind::Projectile {
                    origin: position.0,
                    direction,
                    speed: settings.projectile_speed,
                    damage: settings.projectile_damage,
                },
            });
            shots += 1;
        }

        label.set(agent.current_action_name().unwrap_or("Replanning"));
    }

    crate::profile_log!(tick, "[GOAP] {} shots fired this tick", shots);
}
