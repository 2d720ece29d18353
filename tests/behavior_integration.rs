use bevy::app::FixedMain;
use bevy::prelude::*;

use skirmish::ai::behavior::{BehaviorState, EnemyBrain};
use skirmish::ai::combat::Projectile;
use skirmish::ai::config::AiConfig;
use skirmish::ai::fixed_math::{FixedNum, FixedVec2};
use skirmish::ai::simulation::{ActionLabel, AgentIdAllocator, AnimationFlags, Health, Mobility, SimPosition};
use skirmish::ai::spatial::{ObstacleLayer, ObstacleShape};
use skirmish::ai::spawn::{enemy_bundle, target_bundle, EnemyArchetype};
use skirmish::ai::targeting::TargetRegistry;
use skirmish::ai::AiPlugin;

fn v(x: f64, y: f64) -> FixedVec2 {
    FixedVec2::new(FixedNum::from_num(x), FixedNum::from_num(y))
}

fn arena_app(obstacles: ObstacleLayer) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(AiConfig::default());
    app.insert_resource(obstacles);
    app.add_plugins(AiPlugin);
    app.update();
    app
}

fn step(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(First);
        app.world_mut().run_schedule(FixedMain);
    }
}

fn spawn_target(app: &mut App, at: FixedVec2, health: f64) -> Entity {
    let id = app.world_mut().resource_mut::<TargetRegistry>().allocate();
    app.world_mut()
        .spawn(target_bundle(id, at, FixedNum::from_num(health)))
        .id()
}

fn spawn_enemy(app: &mut App, at: FixedVec2, archetype: EnemyArchetype) -> Entity {
    let config = app.world().resource::<AiConfig>().clone();
    let id = app.world_mut().resource_mut::<AgentIdAllocator>().allocate();
    app.world_mut().spawn(enemy_bundle(id, at, &config, archetype)).id()
}

fn health(app: &App, entity: Entity) -> FixedNum {
    app.world().get::<Health>(entity).unwrap().current
}

#[test]
fn test_brute_closes_in_and_swings_on_a_timer() {
    let mut app = arena_app(ObstacleLayer::new());
    let target = spawn_target(&mut app, v(0.0, 0.0), 100.0);
    let brute = spawn_enemy(&mut app, v(3.0, 0.0), EnemyArchetype::Brute);

    // Reaches swing range on tick 19, then swings at 19, 49 and 79.
    step(&mut app, 90);

    assert_eq!(health(&app, target), FixedNum::from_num(55));
    assert_eq!(app.world().get::<ActionLabel>(brute).unwrap().0, "Swing");
    assert!(!app.world().get::<Mobility>(brute).unwrap().can_move);
    let flags = app.world().get::<AnimationFlags>(brute).unwrap();
    assert!(flags.attacking);
    assert!(!flags.chasing);

    let position = app.world().get::<SimPosition>(brute).unwrap().0;
    let range = app.world().resource::<AiConfig>().attack.melee.range;
    assert!(position.distance(v(0.0, 0.0)) <= range);
}

#[test]
fn test_idle_agent_ignores_distant_target() {
    let mut app = arena_app(ObstacleLayer::new());
    let target = spawn_target(&mut app, v(0.0, 0.0), 100.0);
    let brute = spawn_enemy(&mut app, v(12.0, 0.0), EnemyArchetype::Brute);

    step(&mut app, 60);

    let brain = app.world().get::<EnemyBrain>(brute).unwrap();
    assert_eq!(brain.state(), BehaviorState::Idle);
    assert_eq!(brain.transitions(), 0);
    assert_eq!(app.world().get::<SimPosition>(brute).unwrap().0, v(12.0, 0.0));
    assert_eq!(health(&app, target), FixedNum::from_num(100));
}

#[test]
fn test_skirmisher_closes_in_and_shoots() {
    let mut app = arena_app(ObstacleLayer::new());
    let target = spawn_target(&mut app, v(0.0, 0.0), 100.0);
    let skirmisher = spawn_enemy(&mut app, v(4.0, 0.0), EnemyArchetype::Skirmisher);

    let mut saw_projectile = false;
    for _ in 0..120 {
        step(&mut app, 1);
        saw_projectile |= app
            .world_mut()
            .query::<&Projectile>()
            .iter(app.world())
            .next()
            .is_some();
    }

    assert!(saw_projectile);
    assert!(health(&app, target) < FixedNum::from_num(100));
    let brain = app.world().get::<EnemyBrain>(skirmisher).unwrap();
    assert_eq!(brain.state(), BehaviorState::Attack);
}

#[test]
fn test_tracker_paths_in_while_target_is_visible() {
    let mut app = arena_app(ObstacleLayer::with_shapes([ObstacleShape::circle(v(2.0, 3.0), FixedNum::from_num(1.0))]));
    let target = spawn_target(&mut app, v(0.0, 0.0), 100.0);
    let tracker = spawn_enemy(&mut app, v(4.0, 0.0), EnemyArchetype::Tracker);

    let mut labels = Vec::new();
    for _ in 0..120 {
        step(&mut app, 1);
        let label = app.world().get::<ActionLabel>(tracker).unwrap().0.clone();
        if labels.last() != Some(&label) {
            labels.push(label);
        }
    }

    assert_eq!(labels, vec!["ChaseLineOfSight".to_string(), "Swing".to_string()]);
    assert!(health(&app, target) < FixedNum::from_num(100));
}

#[test]
fn test_skittish_backs_out_of_reach_and_waits() {
    let mut app = arena_app(ObstacleLayer::new());
    let target = spawn_target(&mut app, v(0.0, 0.0), 100.0);
    let skittish = spawn_enemy(&mut app, v(1.0, 0.0), EnemyArchetype::Skittish);

    step(&mut app, 60);

    let position = app.world().get::<SimPosition>(skittish).unwrap().0;
    let range = app.world().resource::<AiConfig>().ranges.attack_range();
    assert!(position.x > range, "still within reach at {:?}", position);
    assert!(position.x < range + FixedNum::from_num(0.5), "kept running to {:?}", position);
    assert_eq!(app.world().get::<ActionLabel>(skittish).unwrap().0, "Runaway");
    assert_eq!(app.world().get::<EnemyBrain>(skittish).unwrap().state(), BehaviorState::Chase);
    assert_eq!(health(&app, target), FixedNum::from_num(100));
}
