use bevy::prelude::*;
use skirmish_macros::profile;

use super::brain::{BehaviorState, BrainContext, EnemyBrain};
use crate::ai::config::AiConfig;
use crate::ai::pathfinding::PathFollower;
use crate::ai::simulation::{
    ActionLabel, AgentId, AiRng, AnimationFlags, AttackIntent, DesiredVelocity, HomePosition, Mobility, Perception,
    RangeProfile, SimPosition, SimTick, SimVelocity, TargetDestroyed,
};
use crate::ai::spatial::{ObstacleLayer, VisibilityCache};
use crate::ai::squad::{Mate, MateSnapshot, SquadRegistry};

/// Tick every enemy brain in id order.
///
/// Squad-mate positions are snapshotted before any brain runs, so every
/// agent steers against last tick's neighbours.
#[profile(2)]
pub fn run_enemy_brains(
    tick: Res<SimTick>,
    config: Res<AiConfig>,
    obstacles: Option<Res<ObstacleLayer>>,
    mut rng: ResMut<AiRng>,
    mut squads: ResMut<SquadRegistry>,
    mut visibility: ResMut<VisibilityCache>,
    mut intents: MessageWriter<AttackIntent>,
    everyone: Query<(&AgentId, &SimPosition, &SimVelocity)>,
    mut brains: Query<(
        &AgentId,
        &SimPosition,
        Option<&HomePosition>,
        &RangeProfile,
        &Perception,
        &mut EnemyBrain,
        &mut PathFollower,
        &mut DesiredVelocity,
        &mut Mobility,
        &mut AnimationFlags,
        &mut ActionLabel,
    )>,
) {
    let mates: MateSnapshot = everyone
        .iter()
        .map(|(id, position, velocity)| {
            (
                *id,
                Mate {
                    id: *id,
                    position: position.0,
                    velocity: velocity.0,
                },
            )
        })
        .collect();

    let layer = obstacles.as_deref();
    let mut ordered: Vec<_> = brains.iter_mut().collect();
    ordered.sort_by_key(|(id, ..)| **id);

    for (id, position, home, ranges, perception, mut brain, mut follower, mut desired, mut mobility, mut flags, mut label) in
        ordered
    {
        let mut ctx = BrainContext {
            agent: *id,
            dt: config.dt,
            tick: tick.0,
            position: position.0,
            home: home.map(|h| h.0),
            ranges: *ranges,
            perception: *perception,
            obstacles: &layer,
            rng: &mut rng.0,
            squads: &mut squads,
            visibility: &mut visibility,
            follower: &mut follower,
            mates: &mates,
        };
        let output = brain.tick(&mut ctx);

        desired.0 = output.velocity;
        mobility.can_move = output.can_move;
        flags.chasing = brain.state() == BehaviorState::Chase;
        flags.attacking = brain.state() == BehaviorState::Attack;
        label.set(brain.label());

        if let Some((target, kind)) = output.attack {
            intents.write(AttackIntent {
                attacker: *id,
                target,
                kind,
            });
        }
    }

    crate::profile_log!(tick, "[BEHAVIOR] {} squads active", squads.squad_count());
}

/// Let brains drop state tied to targets that no longer exist.
pub fn release_destroyed_targets(mut destroyed: MessageReader<TargetDestroyed>, mut brains: Query<&mut EnemyBrain>) {
    for message in destroyed.read() {
        for mut brain in brains.iter_mut() {
            brain.target_destroyed(message.target);
        }
    }
}
