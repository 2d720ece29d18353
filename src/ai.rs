use bevy::prelude::*;

pub mod behavior;
pub mod combat;
pub mod config;
pub mod fixed_math;
pub mod goap;
pub mod pathfinding;
pub mod simulation;
pub mod spatial;
pub mod spawn;
pub mod squad;
pub mod targeting;

use config::AiConfig;
use simulation::{
    AgentDespawned, AgentIdAllocator, AiRng, AiSet, AttackIntent, SimTick, TargetDestroyed,
};
use spatial::VisibilityCache;
use squad::SquadRegistry;
use targeting::TargetRegistry;

pub use config::AiConfigPlugin;

/// Enemy AI core: sensing, behavior brains, GOAP agents, motion and combat
/// resolution, all inside `FixedUpdate`.
///
/// Configuration comes from whatever [`AiConfig`] is present; add
/// [`AiConfigPlugin`] to load it from `assets/initial_config.ron`. The
/// obstacle layer is optional: without one every cell is walkable.
pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AiConfig>();
        app.init_resource::<SimTick>();
        app.init_resource::<AiRng>();
        app.init_resource::<AgentIdAllocator>();
        app.init_resource::<TargetRegistry>();
        app.init_resource::<SquadRegistry>();
        app.init_resource::<VisibilityCache>();

        app.add_message::<AttackIntent>();
        app.add_message::<TargetDestroyed>();
        app.add_message::<AgentDespawned>();

        app.configure_sets(
            FixedUpdate,
            (AiSet::Sense, AiSet::Decide, AiSet::Integrate, AiSet::Resolve).chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                simulation::systems::increment_sim_tick,
                simulation::systems::sync_target_registry,
                simulation::systems::handle_target_destroyed,
                behavior::systems::release_destroyed_targets,
                simulation::systems::handle_agent_despawned,
                simulation::systems::sense_targets,
            )
                .chain()
                .in_set(AiSet::Sense),
        );

        // Both mutate path followers; brains go first.
        app.add_systems(
            FixedUpdate,
            (behavior::systems::run_enemy_brains, goap::systems::run_goap_agents)
                .chain()
                .in_set(AiSet::Decide),
        );

        app.add_systems(
            FixedUpdate,
            (
                simulation::systems::integrate_motion,
                combat::spawn_projectiles,
                combat::advance_projectiles,
            )
                .chain()
                .in_set(AiSet::Integrate),
        );

        app.add_systems(
            FixedUpdate,
            (
                combat::apply_melee_intents,
                combat::reap_dead_targets,
                combat::reap_dead_agents,
            )
                .chain()
                .in_set(AiSet::Resolve),
        );
    }
}
