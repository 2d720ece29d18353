use bevy::app::FixedMain;
use bevy::prelude::*;

use skirmish::ai::config::AiConfig;
use skirmish::ai::fixed_math::{FixedNum, FixedVec2};
use skirmish::ai::simulation::{ActionLabel, AgentId, AgentIdAllocator, AiRng, Health, SimPosition};
use skirmish::ai::spatial::{ObstacleLayer, ObstacleShape};
use skirmish::ai::spawn::{enemy_bundle, goap_bundle, spawn_enemy_group, target_bundle, EnemyArchetype};
use skirmish::ai::targeting::{Target, TargetId, TargetRegistry};
use skirmish::ai::AiPlugin;

fn v(x: f64, y: f64) -> FixedVec2 {
    FixedVec2::new(FixedNum::from_num(x), FixedNum::from_num(y))
}

fn setup(
    mut commands: Commands,
    config: Res<AiConfig>,
    mut ids: ResMut<AgentIdAllocator>,
    mut targets: ResMut<TargetRegistry>,
    mut rng: ResMut<AiRng>,
) {
    commands.insert_resource(ObstacleLayer::with_shapes([
        ObstacleShape::rect(v(0.0, 3.0), v(2.0, 0.5)),
        ObstacleShape::circle(v(-3.0, -2.0), FixedNum::from_num(1.0)),
    ]));
    commands.spawn(target_bundle(targets.allocate(), v(0.0, 0.0), FixedNum::from_num(400)));
    commands.spawn(target_bundle(targets.allocate(), v(6.0, 5.0), FixedNum::from_num(400)));

    spawn_enemy_group(
        &mut commands,
        &mut ids,
        &mut rng.0,
        &config,
        v(-4.0, 1.0),
        FixedNum::from_num(1.5),
        5,
        EnemyArchetype::Flocker,
    );
    commands.spawn(enemy_bundle(ids.allocate(), v(0.0, 6.0), &config, EnemyArchetype::Tracker));
    commands.spawn(enemy_bundle(ids.allocate(), v(9.0, 5.0), &config, EnemyArchetype::Skirmisher));
    commands.spawn(goap_bundle(ids.allocate(), v(-7.0, -6.0), &config, false));
}

type Snapshot = (Vec<(AgentId, FixedVec2, String)>, Vec<(TargetId, FixedNum)>);

fn run(ticks: usize) -> Snapshot {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(AiConfig::default());
    app.add_plugins(AiPlugin);
    app.add_systems(Startup, setup);
    app.update();

    for _ in 0..ticks {
        app.world_mut().run_schedule(First);
        app.world_mut().run_schedule(FixedMain);
    }

    let world = app.world_mut();
    let mut agents: Vec<_> = world
        .query::<(&AgentId, &SimPosition, &ActionLabel)>()
        .iter(world)
        .map(|(id, position, label)| (*id, position.0, label.0.clone()))
        .collect();
    agents.sort_by_key(|(id, ..)| *id);

    let mut targets: Vec<_> = world
        .query::<(&Target, &Health)>()
        .iter(world)
        .map(|(target, health)| (target.id, health.current))
        .collect();
    targets.sort_by_key(|(id, _)| *id);

    (agents, targets)
}

#[test]
fn test_identical_runs_match_exactly() {
    let first = run(300);
    let second = run(300);

    assert_eq!(first.0.len(), 8);
    assert_eq!(first, second);
}

#[test]
fn test_runs_diverge_with_the_clock() {
    // Sanity check that the comparison above is not vacuous.
    let early = run(30);
    let late = run(300);
    assert_ne!(early.0, late.0);
}
