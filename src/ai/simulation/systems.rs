//! Sense and integrate systems: everything around the decision step.

use bevy::prelude::*;
use skirmish_macros::profile;

use super::components::*;
use super::events::*;
use super::resources::*;
use crate::ai::config::AiConfig;
use crate::ai::spatial::{ObstacleLayer, Occupancy, VisibilityCache};
use crate::ai::squad::SquadRegistry;
use crate::ai::targeting::{Target, TargetRegistry, TargetSnapshot};

// ============================================================================
// Tick Management
// ============================================================================

/// Runs first in `FixedUpdate` so every later system sees this tick's number.
pub fn increment_sim_tick(mut tick: ResMut<SimTick>) {
    tick.increment();
}

// ============================================================================
// Target bookkeeping
// ============================================================================

/// Mirror every `Target` entity into the [`TargetRegistry`].
pub fn sync_target_registry(
    mut registry: ResMut<TargetRegistry>,
    targets: Query<(&Target, &SimPosition, Option<&SimVelocity>, &Health)>,
) {
    let mut live = std::collections::BTreeSet::new();
    for (target, position, velocity, health) in targets.iter() {
        live.insert(target.id);
        registry.upsert(TargetSnapshot {
            id: target.id,
            position: position.0,
            velocity: velocity.map(|v| v.0).unwrap_or_default(),
            health: health.current,
        });
    }
    registry.retain(|id| live.contains(&id));
}

/// Drop squads and cached visibility around targets that left the world.
pub fn handle_target_destroyed(
    mut destroyed: MessageReader<TargetDestroyed>,
    mut registry: ResMut<TargetRegistry>,
    mut squads: ResMut<SquadRegistry>,
    mut visibility: ResMut<VisibilityCache>,
) {
    for message in destroyed.read() {
        registry.remove(message.target);
        let disbanded = squads.target_destroyed(message.target);
        visibility.forget(message.target);
        debug!(
            "[SQUAD] Cleaned up after {:?} ({} squad members released)",
            message.target,
            disbanded.len()
        );
    }
}

pub fn handle_agent_despawned(mut despawned: MessageReader<AgentDespawned>, mut squads: ResMut<SquadRegistry>) {
    for message in despawned.read() {
        squads.agent_destroyed(message.agent);
    }
}

// ============================================================================
// Perception
// ============================================================================

/// Pick a target for every perceiving agent and record what it can see.
///
/// Selection prefers the weakest target in view (Bresenham line of sight),
/// falling back to the nearest target anywhere.
#[profile(2)]
pub fn sense_targets(
    #[allow(unused_variables)] tick: Res<SimTick>,
    config: Res<AiConfig>,
    registry: Res<TargetRegistry>,
    obstacles: Option<Res<ObstacleLayer>>,
    mut agents: Query<(&SimPosition, &RangeProfile, &mut Perception)>,
) {
    let layer = obstacles.as_deref();
    let probe = config.line_of_sight;
    #[allow(unused_variables, unused_assignments)]
    let mut without_target = 0usize;

    for (position, ranges, mut perception) in agents.iter_mut() {
        let from = position.0;
        let selected = registry
            .select_target(from, ranges.view_range(), |t| {
                probe.has_line_of_sight(from, t.position, &layer)
            })
            .copied();

        let Some(target) = selected else {
            perception.clear();
            without_target += 1;
            continue;
        };

        *perception = Perception {
            target: Some(target),
            distance: from.distance(target.position),
            line_of_sight: probe.has_line_of_sight(from, target.position, &layer),
            clear_shot: !layer.segment_blocked(from, target.position),
        };
    }

    crate::profile_log!(tick, "[BEHAVIOR] {} agents without a target", without_target);
}

// ============================================================================
// Integration
// ============================================================================

/// Apply each agent's desired velocity for one fixed step.
pub fn integrate_motion(
    config: Res<AiConfig>,
    mut agents: Query<(&mut SimPosition, &mut SimVelocity, &DesiredVelocity, Option<&Mobility>)>,
) {
    let dt = config.dt;
    for (mut position, mut velocity, desired, mobility) in agents.iter_mut() {
        let can_move = mobility.is_none_or(|m| m.can_move);
        velocity.0 = if can_move { desired.0 } else { Default::default() };
        if !velocity.0.is_zero() {
            position.0 += velocity.0 * dt;
        }
    }
}
