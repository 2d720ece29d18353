use bevy::app::FixedMain;
use bevy::prelude::*;

use skirmish::ai::behavior::{BehaviorState, EnemyBrain};
use skirmish::ai::config::AiConfig;
use skirmish::ai::fixed_math::{FixedNum, FixedVec2};
use skirmish::ai::simulation::{AgentId, AgentIdAllocator, Health};
use skirmish::ai::spatial::ObstacleLayer;
use skirmish::ai::spawn::{enemy_bundle, target_bundle, EnemyArchetype};
use skirmish::ai::squad::SquadRegistry;
use skirmish::ai::targeting::{TargetId, TargetRegistry};
use skirmish::ai::AiPlugin;

fn v(x: f64, y: f64) -> FixedVec2 {
    FixedVec2::new(FixedNum::from_num(x), FixedNum::from_num(y))
}

fn arena_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(AiConfig::default());
    app.insert_resource(ObstacleLayer::new());
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

fn spawn_target(app: &mut App, at: FixedVec2, health: f64) -> (TargetId, Entity) {
    let id = app.world_mut().resource_mut::<TargetRegistry>().allocate();
    let entity = app
        .world_mut()
        .spawn(target_bundle(id, at, FixedNum::from_num(health)))
        .id();
    (id, entity)
}

fn spawn_flocker(app: &mut App, at: FixedVec2) -> (AgentId, Entity) {
    let config = app.world().resource::<AiConfig>().clone();
    let id = app.world_mut().resource_mut::<AgentIdAllocator>().allocate();
    let entity = app
        .world_mut()
        .spawn(enemy_bundle(id, at, &config, EnemyArchetype::Flocker))
        .id();
    (id, entity)
}

/// Slot indices of the current squad members, sorted.
fn squad_slots(app: &App, target: TargetId) -> Vec<usize> {
    let squads = app.world().resource::<SquadRegistry>();
    let Some(squad) = squads.squad(target) else {
        return Vec::new();
    };
    let mut slots: Vec<usize> = squad
        .members()
        .iter()
        .map(|agent| squads.peek_slot(target, *agent).expect("member has a slot"))
        .collect();
    slots.sort_unstable();
    slots
}

fn states(app: &mut App) -> Vec<BehaviorState> {
    app.world_mut()
        .query::<&EnemyBrain>()
        .iter(app.world())
        .map(|brain| brain.state())
        .collect()
}

#[test]
fn test_squad_surrounds_target_and_survives_losses() {
    let mut app = arena_app();
    let (target, target_entity) = spawn_target(&mut app, v(0.0, 0.0), 1000.0);
    let flockers: Vec<_> = [v(3.0, 0.0), v(0.0, 3.0), v(-3.0, 0.0), v(0.0, -3.0)]
        .into_iter()
        .map(|at| spawn_flocker(&mut app, at))
        .collect();

    step(&mut app, 300);

    assert_eq!(squad_slots(&app, target), vec![0, 1, 2, 3]);
    assert!(states(&mut app).iter().all(|s| *s == BehaviorState::Attack));
    for (id, entity) in &flockers {
        let brain = app.world().get::<EnemyBrain>(*entity).unwrap();
        let gather = brain.attack.gather().expect("flockers gather");
        assert_eq!(gather.joined_target(), Some(target));
        assert_eq!(
            gather.slot_index(),
            app.world().resource::<SquadRegistry>().peek_slot(target, *id)
        );
    }

    // Losing a member closes the ring.
    let (dead_id, dead_entity) = flockers[1];
    app.world_mut().get_mut::<Health>(dead_entity).unwrap().current = FixedNum::ZERO;
    step(&mut app, 2);

    assert!(app.world().get_entity(dead_entity).is_err());
    let squads = app.world().resource::<SquadRegistry>();
    assert_eq!(squads.squad(target).map(|s| s.len()), Some(3));
    assert_eq!(squads.membership_of(dead_id), None);
    assert_eq!(squad_slots(&app, target), vec![0, 1, 2]);

    // Losing the target disbands everyone.
    app.world_mut().get_mut::<Health>(target_entity).unwrap().current = FixedNum::ZERO;
    step(&mut app, 2);

    assert!(app.world().get_entity(target_entity).is_err());
    assert_eq!(app.world().resource::<SquadRegistry>().squad_count(), 0);
    assert!(states(&mut app).iter().all(|s| *s == BehaviorState::Idle));
    for (_, entity) in flockers.iter().filter(|(id, _)| *id != dead_id) {
        let brain = app.world().get::<EnemyBrain>(*entity).unwrap();
        assert_eq!(brain.attack.gather().and_then(|g| g.joined_target()), None);
    }
}

#[test]
fn test_lone_flocker_takes_slot_zero() {
    let mut app = arena_app();
    let (target, _) = spawn_target(&mut app, v(0.0, 0.0), 1000.0);
    let (id, _) = spawn_flocker(&mut app, v(2.0, 1.0));

    step(&mut app, 120);

    let squads = app.world().resource::<SquadRegistry>();
    assert_eq!(squads.membership_of(id), Some(target));
    assert_eq!(squads.peek_slot(target, id), Some(0));
}
