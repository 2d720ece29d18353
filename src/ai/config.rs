use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::behavior::{DotGridSettings, LosChaseSettings, MeleeSettings, ProjectileSettings, WanderSettings};
use crate::ai::combat::CombatSettings;
use crate::ai::fixed_math::FixedNum;
use crate::ai::goap::{DistanceBands, GoapSettings};
use crate::ai::pathfinding::{AvoidanceProbe, Footprint, FollowerSettings, OrbitGains, SearchParams};
use crate::ai::simulation::{AiRng, RangeProfile};
use crate::ai::spatial::{GridSpec, LineOfSightProbe};
use crate::ai::squad::{FlockSettings, FlockWeights, GatherSettings, RingSettings};

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration loaded once at startup. Plain floats so the file
/// stays readable; converted to fixed-point once in [`AiConfig`]. Changing
/// these mid-run would break determinism.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    pub simulation: SimulationSection,
    pub grid: GridSection,
    pub pathfinding: PathfindingSection,
    pub squad: SquadSection,
    pub goap: GoapSection,
    pub chase: ChaseSection,
    pub attack: AttackSection,
    pub idle: IdleSection,
    pub agent: AgentSection,
    pub combat: CombatSection,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SimulationSection {
    pub tick_rate: f64,
    pub seed: u64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            seed: AiRng::DEFAULT_SEED,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GridSection {
    pub cell_size: f32,
    pub occupancy_fraction: f32,
    pub agent_radius: f32,
    pub line_of_sight_probe_radius: f32,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            occupancy_fraction: 0.8,
            agent_radius: 0.25,
            line_of_sight_probe_radius: 0.4,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PathfindingSection {
    pub move_speed: f32,
    pub waypoint_threshold: f32,
    pub repath_goal_moved: f32,
    pub hard_repath_interval: f32,
    pub min_progress_per_second: f32,
    pub progress_window: f32,
    pub window_half_extents: (i32, i32),
    pub allow_diagonal: bool,
    pub max_expanded_nodes: usize,
    pub goal_snap_radius: i32,
    pub start_snap_radius: i32,
    pub avoidance_forward: f32,
    pub avoidance_side: f32,
    pub avoidance_gain: f32,
}

impl Default for PathfindingSection {
    fn default() -> Self {
        Self {
            move_speed: 2.5,
            waypoint_threshold: 0.2,
            repath_goal_moved: 0.5,
            hard_repath_interval: 0.75,
            min_progress_per_second: 0.02,
            progress_window: 0.5,
            window_half_extents: (40, 40),
            allow_diagonal: true,
            max_expanded_nodes: 5000,
            goal_snap_radius: 4,
            start_snap_radius: 2,
            avoidance_forward: 0.9,
            avoidance_side: 0.5,
            avoidance_gain: 0.9,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SquadSection {
    pub desired_ring_radius: f32,
    pub min_ring_radius: f32,
    pub ring_shrink_speed: f32,
    pub max_speed: f32,
    pub separation_radius: f32,
    pub slot_arrival_threshold: f32,
    pub separation_weight: f32,
    pub cohesion_weight: f32,
    pub alignment_weight: f32,
    pub slot_weight: f32,
    pub attack_damage: f32,
    pub attack_cooldown: f32,
    pub attack_range_bonus: f32,
}

impl Default for SquadSection {
    fn default() -> Self {
        Self {
            desired_ring_radius: 3.0,
            min_ring_radius: 1.2,
            ring_shrink_speed: 0.4,
            max_speed: 4.0,
            separation_radius: 0.8,
            slot_arrival_threshold: 1.0,
            separation_weight: 1.5,
            cohesion_weight: 0.6,
            alignment_weight: 0.4,
            slot_weight: 2.0,
            attack_damage: 10.0,
            attack_cooldown: 0.8,
            attack_range_bonus: 0.3,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GoapSection {
    pub near_distance: f32,
    pub mid_distance: f32,
    pub fire_cooldown: f32,
    pub replan_cooldown: f32,
    pub move_speed: f32,
    pub low_health_fraction: f32,
    pub preferred_radius: f32,
    pub orbit_tangential_speed: f32,
    pub orbit_kp: f32,
    pub orbit_kd: f32,
    pub max_radial_speed: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub shoot_settle: f32,
    pub approach_timeout: f32,
    pub acquire_timeout: f32,
    pub wait_timeout: f32,
}

impl Default for GoapSection {
    fn default() -> Self {
        Self {
            near_distance: 1.8,
            mid_distance: 4.0,
            fire_cooldown: 0.8,
            replan_cooldown: 0.5,
            move_speed: 4.0,
            low_health_fraction: 0.3,
            preferred_radius: 3.0,
            orbit_tangential_speed: 2.2,
            orbit_kp: 2.0,
            orbit_kd: 0.6,
            max_radial_speed: 2.0,
            projectile_speed: 5.0,
            projectile_damage: 10.0,
            shoot_settle: 0.05,
            approach_timeout: 6.0,
            acquire_timeout: 3.0,
            wait_timeout: 3.0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ChaseSection {
    pub direct_speed: f32,
    pub runaway_speed: f32,
    pub los_view_distance: f32,
    pub los_forget_distance: f32,
    pub dot_view_distance: f32,
    pub inner_factor: f32,
    pub min_inner_distance: f32,
    pub dot_reach_threshold: f32,
    pub repath_interval: f32,
    pub weight_player: f32,
    pub weight_enemy: f32,
    pub grid_radius: f32,
    pub grid_spacing: f32,
}

impl Default for ChaseSection {
    fn default() -> Self {
        Self {
            direct_speed: 2.5,
            runaway_speed: 2.0,
            los_view_distance: 10.0,
            los_forget_distance: 0.5,
            dot_view_distance: 8.0,
            inner_factor: 0.35,
            min_inner_distance: 0.05,
            dot_reach_threshold: 0.35,
            repath_interval: 0.2,
            weight_player: 1.0,
            weight_enemy: 0.15,
            grid_radius: 3.0,
            grid_spacing: 1.0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AttackSection {
    pub projectile_interval: f32,
    pub projectile_exit_distance: f32,
    pub projectile_exit_time: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_shot_limit: Option<u32>,
    pub melee_interval: f32,
    pub melee_range: f32,
    pub melee_damage: f32,
}

impl Default for AttackSection {
    fn default() -> Self {
        Self {
            projectile_interval: 1.0,
            projectile_exit_distance: 3.0,
            projectile_exit_time: 2.0,
            projectile_speed: 5.0,
            projectile_damage: 10.0,
            projectile_shot_limit: None,
            melee_interval: 1.0,
            melee_range: 1.5,
            melee_damage: 15.0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct IdleSection {
    pub wander_range: f32,
    pub wander_speed: f32,
    pub arrive_distance: f32,
}

impl Default for IdleSection {
    fn default() -> Self {
        Self {
            wander_range: 0.5,
            wander_speed: 1.0,
            arrive_distance: 0.1,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AgentSection {
    pub aggro_range: f32,
    pub attack_range: f32,
    pub view_range: f32,
    pub max_health: f32,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            aggro_range: RangeProfile::DEFAULT_AGGRO as f32,
            attack_range: RangeProfile::DEFAULT_ATTACK as f32,
            view_range: RangeProfile::DEFAULT_VIEW as f32,
            max_health: 100.0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CombatSection {
    pub projectile_lifetime: f32,
    pub projectile_hit_radius: f32,
}

impl Default for CombatSection {
    fn default() -> Self {
        Self {
            projectile_lifetime: 5.0,
            projectile_hit_radius: 0.3,
        }
    }
}

// ============================================================================
// Runtime configuration
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChaseDefaults {
    pub direct_speed: FixedNum,
    pub runaway_speed: FixedNum,
    pub line_of_sight: LosChaseSettings,
    pub dot_grid: DotGridSettings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackDefaults {
    pub projectile: ProjectileSettings,
    pub melee: MeleeSettings,
}

/// Fixed-point settings every AI system reads. Built once from
/// [`InitialConfig`]; tests may insert one directly.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct AiConfig {
    pub tick_rate: f64,
    pub dt: FixedNum,
    pub seed: u64,
    pub grid: GridSpec,
    pub line_of_sight: LineOfSightProbe,
    pub follower: FollowerSettings,
    pub gather: GatherSettings,
    pub goap: GoapSettings,
    pub wander: WanderSettings,
    pub chase: ChaseDefaults,
    pub attack: AttackDefaults,
    pub ranges: RangeProfile,
    pub max_health: FixedNum,
    pub combat: CombatSettings,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from(&InitialConfig::default())
    }
}

/// Convert one config value, falling back to its default when it is not
/// finite or does not fit the fixed-point range.
fn fixed(value: f32, default: f32, field: &str) -> FixedNum {
    if value.is_finite() {
        if let Some(converted) = FixedNum::checked_from_num(value) {
            return converted;
        }
    }
    warn!("[CONFIG] Invalid {} {}, using {}", field, value, default);
    FixedNum::from_num(default)
}

impl From<&InitialConfig> for AiConfig {
    fn from(initial: &InitialConfig) -> Self {
        let d = InitialConfig::default();

        let mut tick_rate = initial.simulation.tick_rate;
        let representable = tick_rate.is_finite()
            && tick_rate > 0.0
            && FixedNum::checked_from_num(1.0 / tick_rate).is_some_and(|dt| dt > FixedNum::ZERO);
        if !representable {
            warn!("[CONFIG] Invalid tick_rate {}, using {}", tick_rate, d.simulation.tick_rate);
            tick_rate = d.simulation.tick_rate;
        }
        let dt = FixedNum::from_num(1.0 / tick_rate);

        let g = &initial.grid;
        let grid = GridSpec::new(fixed(g.cell_size.max(0.01), d.grid.cell_size, "grid.cell_size"));
        let line_of_sight = LineOfSightProbe {
            grid,
            probe_radius: fixed(g.line_of_sight_probe_radius, d.grid.line_of_sight_probe_radius, "grid.line_of_sight_probe_radius"),
        };

        let p = &initial.pathfinding;
        let follower = FollowerSettings {
            grid,
            move_speed: fixed(p.move_speed, d.pathfinding.move_speed, "pathfinding.move_speed"),
            waypoint_threshold: fixed(p.waypoint_threshold, d.pathfinding.waypoint_threshold, "pathfinding.waypoint_threshold"),
            repath_goal_moved: fixed(p.repath_goal_moved, d.pathfinding.repath_goal_moved, "pathfinding.repath_goal_moved"),
            hard_repath_interval: fixed(p.hard_repath_interval, d.pathfinding.hard_repath_interval, "pathfinding.hard_repath_interval"),
            min_progress_per_second: fixed(p.min_progress_per_second, d.pathfinding.min_progress_per_second, "pathfinding.min_progress_per_second"),
            progress_window: fixed(p.progress_window, d.pathfinding.progress_window, "pathfinding.progress_window"),
            window_half_extents: (p.window_half_extents.0.max(0), p.window_half_extents.1.max(0)),
            search: SearchParams {
                allow_diagonal: p.allow_diagonal,
                max_expanded_nodes: p.max_expanded_nodes,
                goal_snap_radius: p.goal_snap_radius.max(0),
                start_snap_radius: p.start_snap_radius.max(0),
            },
            footprint: Footprint {
                occupancy_fraction: fixed(g.occupancy_fraction, d.grid.occupancy_fraction, "grid.occupancy_fraction"),
                agent_radius: fixed(g.agent_radius, d.grid.agent_radius, "grid.agent_radius"),
            },
            avoidance: AvoidanceProbe {
                forward: fixed(p.avoidance_forward, d.pathfinding.avoidance_forward, "pathfinding.avoidance_forward"),
                side: fixed(p.avoidance_side, d.pathfinding.avoidance_side, "pathfinding.avoidance_side"),
                gain: fixed(p.avoidance_gain, d.pathfinding.avoidance_gain, "pathfinding.avoidance_gain"),
            },
        };

        let s = &initial.squad;
        let gather = GatherSettings {
            ring: RingSettings {
                desired_radius: fixed(s.desired_ring_radius, d.squad.desired_ring_radius, "squad.desired_ring_radius"),
                min_radius: fixed(s.min_ring_radius, d.squad.min_ring_radius, "squad.min_ring_radius"),
                shrink_speed: fixed(s.ring_shrink_speed, d.squad.ring_shrink_speed, "squad.ring_shrink_speed"),
            }
            .sanitized(),
            flock: FlockSettings {
                max_speed: fixed(s.max_speed, d.squad.max_speed, "squad.max_speed"),
                separation_radius: fixed(s.separation_radius, d.squad.separation_radius, "squad.separation_radius"),
                slot_arrival_threshold: fixed(s.slot_arrival_threshold, d.squad.slot_arrival_threshold, "squad.slot_arrival_threshold"),
                weights: FlockWeights {
                    separation: fixed(s.separation_weight, d.squad.separation_weight, "squad.separation_weight"),
                    cohesion: fixed(s.cohesion_weight, d.squad.cohesion_weight, "squad.cohesion_weight"),
                    alignment: fixed(s.alignment_weight, d.squad.alignment_weight, "squad.alignment_weight"),
                    slot: fixed(s.slot_weight, d.squad.slot_weight, "squad.slot_weight"),
                },
            },
            attack_damage: fixed(s.attack_damage, d.squad.attack_damage, "squad.attack_damage"),
            attack_cooldown: fixed(s.attack_cooldown, d.squad.attack_cooldown, "squad.attack_cooldown"),
            attack_range_bonus: fixed(s.attack_range_bonus, d.squad.attack_range_bonus, "squad.attack_range_bonus"),
        };

        let q = &initial.goap;
        let goap = GoapSettings {
            bands: DistanceBands {
                near: fixed(q.near_distance, d.goap.near_distance, "goap.near_distance"),
                mid: fixed(q.mid_distance, d.goap.mid_distance, "goap.mid_distance"),
            },
            fire_cooldown: fixed(q.fire_cooldown, d.goap.fire_cooldown, "goap.fire_cooldown"),
            replan_cooldown: fixed(q.replan_cooldown, d.goap.replan_cooldown, "goap.replan_cooldown"),
            move_speed: fixed(q.move_speed, d.goap.move_speed, "goap.move_speed"),
            low_health_fraction: fixed(q.low_health_fraction, d.goap.low_health_fraction, "goap.low_health_fraction"),
            preferred_radius: fixed(q.preferred_radius, d.goap.preferred_radius, "goap.preferred_radius"),
            orbit: OrbitGains {
                tangential_speed: fixed(q.orbit_tangential_speed, d.goap.orbit_tangential_speed, "goap.orbit_tangential_speed"),
                kp: fixed(q.orbit_kp, d.goap.orbit_kp, "goap.orbit_kp"),
                kd: fixed(q.orbit_kd, d.goap.orbit_kd, "goap.orbit_kd"),
            },
            max_radial_speed: fixed(q.max_radial_speed, d.goap.max_radial_speed, "goap.max_radial_speed"),
            projectile_speed: fixed(q.projectile_speed, d.goap.projectile_speed, "goap.projectile_speed"),
            projectile_damage: fixed(q.projectile_damage, d.goap.projectile_damage, "goap.projectile_damage"),
            shoot_settle: fixed(q.shoot_settle, d.goap.shoot_settle, "goap.shoot_settle"),
            approach_timeout: fixed(q.approach_timeout, d.goap.approach_timeout, "goap.approach_timeout"),
            acquire_timeout: fixed(q.acquire_timeout, d.goap.acquire_timeout, "goap.acquire_timeout"),
            wait_timeout: fixed(q.wait_timeout, d.goap.wait_timeout, "goap.wait_timeout"),
        };

        let c = &initial.chase;
        let chase = ChaseDefaults {
            direct_speed: fixed(c.direct_speed, d.chase.direct_speed, "chase.direct_speed"),
            runaway_speed: fixed(c.runaway_speed, d.chase.runaway_speed, "chase.runaway_speed"),
            line_of_sight: LosChaseSettings {
                view_distance: fixed(c.los_view_distance, d.chase.los_view_distance, "chase.los_view_distance"),
                forget_distance: fixed(c.los_forget_distance, d.chase.los_forget_distance, "chase.los_forget_distance"),
            },
            dot_grid: DotGridSettings {
                view_distance: fixed(c.dot_view_distance, d.chase.dot_view_distance, "chase.dot_view_distance"),
                inner_factor: fixed(c.inner_factor, d.chase.inner_factor, "chase.inner_factor"),
                min_inner_distance: fixed(c.min_inner_distance, d.chase.min_inner_distance, "chase.min_inner_distance"),
                dot_reach_threshold: fixed(c.dot_reach_threshold, d.chase.dot_reach_threshold, "chase.dot_reach_threshold"),
                repath_interval: fixed(c.repath_interval, d.chase.repath_interval, "chase.repath_interval"),
                weight_player: fixed(c.weight_player, d.chase.weight_player, "chase.weight_player"),
                weight_enemy: fixed(c.weight_enemy, d.chase.weight_enemy, "chase.weight_enemy"),
                grid_radius: fixed(c.grid_radius, d.chase.grid_radius, "chase.grid_radius"),
                grid_spacing: fixed(c.grid_spacing.max(0.01), d.chase.grid_spacing, "chase.grid_spacing"),
            },
        };

        let a = &initial.attack;
        let attack = AttackDefaults {
            projectile: ProjectileSettings {
                interval: fixed(a.projectile_interval, d.attack.projectile_interval, "attack.projectile_interval"),
                exit_distance: fixed(a.projectile_exit_distance, d.attack.projectile_exit_distance, "attack.projectile_exit_distance"),
                exit_time: fixed(a.projectile_exit_time, d.attack.projectile_exit_time, "attack.projectile_exit_time"),
                speed: fixed(a.projectile_speed, d.attack.projectile_speed, "attack.projectile_speed"),
                damage: fixed(a.projectile_damage, d.attack.projectile_damage, "attack.projectile_damage"),
                shot_limit: a.projectile_shot_limit,
            },
            melee: MeleeSettings {
                interval: fixed(a.melee_interval, d.attack.melee_interval, "attack.melee_interval"),
                range: fixed(a.melee_range, d.attack.melee_range, "attack.melee_range"),
                damage: fixed(a.melee_damage, d.attack.melee_damage, "attack.melee_damage"),
            },
        };

        let i = &initial.idle;
        let wander = WanderSettings {
            range: fixed(i.wander_range, d.idle.wander_range, "idle.wander_range"),
            speed: fixed(i.wander_speed, d.idle.wander_speed, "idle.wander_speed"),
            arrive_distance: fixed(i.arrive_distance, d.idle.arrive_distance, "idle.arrive_distance"),
        };

        let agent = &initial.agent;
        Self {
            tick_rate,
            dt,
            seed: initial.simulation.seed,
            grid,
            line_of_sight,
            follower,
            gather,
            goap,
            wander,
            chase,
            attack,
            ranges: RangeProfile::new(
                fixed(agent.aggro_range, d.agent.aggro_range, "agent.aggro_range"),
                fixed(agent.attack_range, d.agent.attack_range, "agent.attack_range"),
                fixed(agent.view_range, d.agent.view_range, "agent.view_range"),
            ),
            max_health: fixed(agent.max_health, d.agent.max_health, "agent.max_health"),
            combat: CombatSettings {
                projectile_lifetime: fixed(initial.combat.projectile_lifetime, d.combat.projectile_lifetime, "combat.projectile_lifetime"),
                projectile_hit_radius: fixed(initial.combat.projectile_hit_radius, d.combat.projectile_hit_radius, "combat.projectile_hit_radius"),
            },
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

pub struct AiConfigPlugin;

impl Plugin for AiConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (load_initial_config, apply_initial_config).chain());
    }
}

/// Parse an [`InitialConfig`], falling back to defaults on any error.
pub fn read_initial_config(path: &str) -> InitialConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match ron::from_str::<InitialConfig>(&contents) {
            Ok(config) => {
                info!("[CONFIG] Loaded initial config from {}", path);
                config
            }
            Err(e) => {
                error!("[CONFIG] Failed to parse initial config: {}", e);
                error!("[CONFIG] Using default InitialConfig");
                InitialConfig::default()
            }
        },
        Err(e) => {
            error!("[CONFIG] Failed to read {}: {}", path, e);
            error!("[CONFIG] Using default InitialConfig");
            InitialConfig::default()
        }
    }
}

/// Load static configuration synchronously at startup, before any tick runs.
/// A config inserted beforehand (tests, the demo) is left alone.
pub fn load_initial_config(mut commands: Commands, existing: Option<Res<InitialConfig>>) {
    if existing.is_none() {
        commands.insert_resource(read_initial_config(INITIAL_CONFIG_PATH));
    }
}

pub fn apply_initial_config(
    mut commands: Commands,
    initial: Res<InitialConfig>,
    fixed_time: Option<ResMut<Time<Fixed>>>,
) {
    let config = AiConfig::from(&*initial);
    if let Some(mut fixed_time) = fixed_time {
        fixed_time.set_timestep_seconds(1.0 / config.tick_rate);
    }
    info!(
        "[CONFIG] Tick rate {} Hz, seed {:#x}",
        config.tick_rate, config.seed
    );
    commands.insert_resource(AiRng::seeded(config.seed));
    commands.insert_resource(config);
}
