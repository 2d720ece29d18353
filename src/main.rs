use bevy::app::FixedMain;
use bevy::prelude::*;

use skirmish::ai::config::AiConfig;
use skirmish::ai::fixed_math::{FixedNum, FixedVec2};
use skirmish::ai::goap::GoapAgent;
use skirmish::ai::simulation::{ActionLabel, AgentId, AgentIdAllocator, AiRng, Health, SimPosition, SimTick};
use skirmish::ai::spatial::{ObstacleLayer, ObstacleShape};
use skirmish::ai::spawn::{enemy_bundle, goap_bundle, spawn_enemy_group, target_bundle, EnemyArchetype};
use skirmish::ai::targeting::{Target, TargetRegistry};
use skirmish::ai::{AiConfigPlugin, AiPlugin};

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_TICKS: u64 = 900;
const REPORT_EVERY: u64 = 60;

fn setup_file_logging() -> String {
    let log_dir = PathBuf::from("logs");
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create logs directory: {}", e);
    }

    // Keep only the newest runs
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("skirmish_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false).compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,skirmish=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("skirmish") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

fn v(x: f32, y: f32) -> FixedVec2 {
    FixedVec2::new(FixedNum::from_num(x), FixedNum::from_num(y))
}

/// Walls, two targets, a flocking squad, two pathing chasers, a brute and a
/// GOAP shooter.
fn setup_arena(
    mut commands: Commands,
    config: Res<AiConfig>,
    mut ids: ResMut<AgentIdAllocator>,
    mut targets: ResMut<TargetRegistry>,
    mut rng: ResMut<AiRng>,
) {
    commands.insert_resource(ObstacleLayer::with_shapes([
        ObstacleShape::rect(v(0.0, 4.0), v(3.0, 0.5)),
        ObstacleShape::rect(v(6.0, -2.0), v(0.5, 3.0)),
        ObstacleShape::circle(v(-4.0, -4.0), FixedNum::from_num(1.5)),
    ]));

    let health = FixedNum::from_num(150);
    commands.spawn(target_bundle(targets.allocate(), v(0.0, 0.0), health));
    commands.spawn(target_bundle(targets.allocate(), v(9.0, 8.0), health));

    spawn_enemy_group(
        &mut commands,
        &mut ids,
        &mut rng.0,
        &config,
        v(-7.0, 1.0),
        FixedNum::from_num(1.5),
        4,
        EnemyArchetype::Flocker,
    );

    commands.spawn(enemy_bundle(ids.allocate(), v(0.0, 8.0), &config, EnemyArchetype::Tracker));
    commands.spawn(enemy_bundle(ids.allocate(), v(16.0, 8.0), &config, EnemyArchetype::Skirmisher));
    commands.spawn(enemy_bundle(ids.allocate(), v(3.0, -3.0), &config, EnemyArchetype::Brute));
    commands.spawn(goap_bundle(ids.allocate(), v(-8.0, -8.0), &config, true));

    info!("Arena ready");
}

fn report(world: &mut World) {
    let tick = world.resource::<SimTick>().get();

    let mut agents: Vec<_> = world
        .query::<(&AgentId, &SimPosition, &ActionLabel, Option<&GoapAgent>)>()
        .iter(world)
        .map(|(id, position, label, goap)| {
            let plan = goap.and_then(|g| g.plan()).map(|p| p.names().join(" > ")).unwrap_or_default();
            (*id, position.0, label.0.clone(), plan)
        })
        .collect();
    agents.sort_by_key(|(id, ..)| *id);

    info!("── tick {} ──", tick);
    for (id, position, label, plan) in agents {
        let (x, y) = (position.x.to_num::<f32>(), position.y.to_num::<f32>());
        if plan.is_empty() {
            info!("  {:?} at ({:6.2}, {:6.2}) {}", id, x, y, label);
        } else {
            info!("  {:?} at ({:6.2}, {:6.2}) {} [{}]", id, x, y, label, plan);
        }
    }

    let mut targets: Vec<_> = world
        .query::<(&Target, &Health)>()
        .iter(world)
        .map(|(t, h)| (t.id, h.current))
        .collect();
    targets.sort_by_key(|(id, _)| *id);
    for (id, health) in targets {
        info!("  {:?} health {}", id, health);
    }
}

fn main() {
    let log_file = setup_file_logging();

    let ticks = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICKS);

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Skirmish AI arena - Logging to file                     ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Log file: {:<45} ║", log_file);
    println!("║  Ticks:    {:<45} ║", ticks);
    println!("╚══════════════════════════════════════════════════════════╝");

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins((AiConfigPlugin, AiPlugin))
        .add_systems(Startup, setup_arena.after(skirmish::ai::config::apply_initial_config));

    // Runs Startup
    app.update();

    // Step the fixed schedules directly so the run is independent of wall time.
    for _ in 0..ticks {
        app.world_mut().run_schedule(First);
        app.world_mut().run_schedule(FixedMain);

        let tick = app.world().resource::<SimTick>().get();
        if tick % REPORT_EVERY == 0 {
            report(app.world_mut());
        }
        if app.world_mut().query::<&Target>().iter(app.world()).next().is_none() {
            info!("All targets destroyed at tick {}", tick);
            break;
        }
    }

    report(app.world_mut());
}
