use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::ai::fixed_math::{fx, FixedNum, FixedVec2};
use crate::ai::pathfinding::PathFollower;
use crate::ai::simulation::{AgentId, AttackKind, Perception, RangeProfile};
use crate::ai::spatial::{ObstacleLayer, VisibilityCache};
use crate::ai::squad::{GatherAttack, GatherSettings, MateSnapshot, SquadRegistry};
use crate::ai::targeting::{TargetId, TargetSnapshot};

fn v(x: f64, y: f64) -> FixedVec2 {
    FixedVec2::new(fx(x), fx(y))
}

struct Harness {
    rng: StdRng,
    squads: SquadRegistry,
    visibility: VisibilityCache,
    follower: PathFollower,
    mates: MateSnapshot,
    obstacles: ObstacleLayer,
    tick: u64,
}

impl Harness {
    fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(7),
            squads: SquadRegistry::default(),
            visibility: VisibilityCache::default(),
            follower: PathFollower::default(),
            mates: MateSnapshot::new(),
            obstacles: ObstacleLayer::new(),
            tick: 0,
        }
    }

    fn ctx(&mut self, position: FixedVec2, perception: Perception) -> BrainContext<'_> {
        self.tick += 1;
        BrainContext {
            agent: AgentId(0),
            dt: fx(0.05),
            tick: self.tick,
            position,
            home: Some(FixedVec2::ZERO),
            ranges: RangeProfile::default(),
            perception,
            obstacles: &self.obstacles,
            rng: &mut self.rng,
            squads: &mut self.squads,
            visibility: &mut self.visibility,
            follower: &mut self.follower,
            mates: &self.mates,
        }
    }
}

fn seen(from: FixedVec2, at: FixedVec2) -> Perception {
    Perception {
        target: Some(TargetSnapshot {
            id: TargetId(1),
            position: at,
            velocity: FixedVec2::ZERO,
            health: fx(100.0),
        }),
        distance: from.distance(at),
        line_of_sight: true,
        clear_shot: true,
    }
}

fn melee_brain() -> EnemyBrain {
    EnemyBrain::new(
        IdleStrategy::StandStill,
        ChaseStrategy::direct(fx(2.0)),
        AttackStrategy::melee(MeleeSettings::default()),
    )
}

#[test]
fn idle_chase_attack_and_back() {
    let mut h = Harness::new();
    let mut brain = melee_brain();
    let me = FixedVec2::ZERO;

    let out = brain.tick(&mut h.ctx(me, seen(me, v(8.0, 0.0))));
    assert_eq!(brain.state(), BehaviorState::Idle, "outside aggro range");
    assert_eq!(out.velocity, FixedVec2::ZERO);

    let out = brain.tick(&mut h.ctx(me, seen(me, v(4.0, 0.0))));
    assert_eq!(brain.state(), BehaviorState::Chase);
    assert_eq!(out.velocity, v(2.0, 0.0));

    let out = brain.tick(&mut h.ctx(me, seen(me, v(1.0, 0.0))));
    assert_eq!(brain.state(), BehaviorState::Attack);
    assert!(!out.can_move, "melee swings root the agent");
    assert_eq!(
        out.attack,
        Some((
            TargetId(1),
            AttackKind::Melee {
                damage: fx(15.0),
                range: fx(1.5)
            }
        ))
    );

    let out = brain.tick(&mut h.ctx(me, seen(me, v(1.0, 0.0))));
    assert_eq!(out.attack, None, "swing is on cooldown");
    assert!(!brain.attack_ready());

    brain.tick(&mut h.ctx(me, seen(me, v(3.0, 0.0))));
    assert_eq!(brain.state(), BehaviorState::Chase);

    brain.tick(&mut h.ctx(me, Perception::default()));
    assert_eq!(brain.state(), BehaviorState::Idle);
    assert_eq!(brain.transitions(), 4);
}

#[test]
fn runaway_backs_off_inside_attack_range_and_never_attacks() {
    let mut h = Harness::new();
    let mut brain = EnemyBrain::new(
        IdleStrategy::StandStill,
        ChaseStrategy::runaway(fx(2.0)),
        AttackStrategy::melee(MeleeSettings::default()),
    );
    let me = FixedVec2::ZERO;

    let out = brain.tick(&mut h.ctx(me, seen(me, v(1.0, 0.0))));
    assert_eq!(brain.state(), BehaviorState::Chase);
    assert_eq!(brain.label(), "Runaway");
    assert_eq!(out.velocity, v(-2.0, 0.0));
    assert_eq!(out.attack, None);

    let target = v(0.6, 0.8);
    let out = brain.tick(&mut h.ctx(me, seen(me, target)));
    assert_eq!(brain.state(), BehaviorState::Chase, "stays out of the attack state");
    assert!(out.velocity.dot(target - me) < FixedNum::ZERO, "flees away from the target");
    assert!((out.velocity.length() - fx(2.0)).abs() <= fx(0.01));

    // Inside aggro range but beyond attack range: hold still.
    let out = brain.tick(&mut h.ctx(me, seen(me, v(4.0, 0.0))));
    assert_eq!(brain.state(), BehaviorState::Chase);
    assert_eq!(out.velocity, FixedVec2::ZERO);
    assert_eq!(brain.transitions(), 1);
}

#[test]
fn wander_stays_near_home() {
    let mut h = Harness::new();
    let mut idle = IdleStrategy::wander(WanderSettings::default());
    let mut position = v(0.1, -0.1);
    for _ in 0..200 {
        let velocity = idle.tick(position, FixedVec2::ZERO, &mut h.rng);
        assert!(velocity.length() <= fx(1.0) + fx(0.001));
        position += velocity * fx(0.05);
        assert!(position.x.abs() <= fx(0.6) && position.y.abs() <= fx(0.6));
    }
}

#[test]
fn line_of_sight_chase_remembers_then_returns_home() {
    let mut h = Harness::new();
    let mut brain = EnemyBrain::new(
        IdleStrategy::StandStill,
        ChaseStrategy::line_of_sight(LosChaseSettings::default()),
        AttackStrategy::melee(MeleeSettings::default()),
    );
    let me = v(0.0, 0.0);
    brain.tick(&mut h.ctx(me, seen(me, v(4.0, 0.0))));
    assert_eq!(brain.state(), BehaviorState::Chase);
    assert_eq!(h.follower.goal(), Some(v(4.0, 0.0)));

    // Target slips out of sight: keep heading to where it was.
    let mut hidden = seen(me, v(4.0, 3.0));
    hidden.line_of_sight = false;
    brain.tick(&mut h.ctx(me, hidden));
    assert_eq!(h.follower.goal(), Some(v(4.0, 0.0)));

    // Reached the remembered spot: give up and go home.
    let there = v(4.0, 0.2);
    let mut hidden = seen(there, v(4.0, 3.0));
    hidden.line_of_sight = false;
    brain.tick(&mut h.ctx(there, hidden));
    assert_eq!(h.follower.goal(), Some(FixedVec2::ZERO));

    // Losing the target entirely leaves the chase and clears the goal.
    brain.tick(&mut h.ctx(there, Perception::default()));
    assert_eq!(brain.state(), BehaviorState::Idle);
    assert!(!h.follower.has_goal());
}

#[test]
fn dot_grid_chase_breadcrumbs_from_outside_aggro_range() {
    let mut h = Harness::new();
    let mut chase = ChaseStrategy::dot_grid(DotGridSettings::default());
    let me = FixedVec2::ZERO;
    let velocity = chase.tick(&mut h.ctx(me, seen(me, v(10.0, 0.0))));
    assert_eq!(chase.current_dot(), Some(v(8.0, 0.0)));
    assert!(velocity.x > FixedNum::ZERO);
    assert!(!chase.can_strike());
    let stats = h.visibility.get(TargetId(1)).map(|g| g.stats());
    assert_eq!(stats.map(|s| s.blocked), Some(0));
}

#[test]
fn dot_grid_chase_closes_to_inner_point_inside_aggro_range() {
    let mut h = Harness::new();
    let mut chase = ChaseStrategy::dot_grid(DotGridSettings::default());
    let target = v(4.0, 0.0);

    let me = FixedVec2::ZERO;
    chase.tick(&mut h.ctx(me, seen(me, target)));
    // attack 1.5 * inner 0.35 = 0.525 short of the target, on our side.
    let inner = target - v(1.5 * 0.35, 0.0);
    let goal = h.follower.goal().expect("goal");
    assert!(goal.distance(inner) < fx(0.001));
    assert_eq!(chase.current_dot(), None);

    chase.tick(&mut h.ctx(goal, seen(goal, target)));
    assert!(chase.can_strike());
}

#[test]
fn projectile_attack_fires_on_a_timer_and_exits_late() {
    let mut h = Harness::new();
    let settings = ProjectileSettings {
        shot_limit: Some(2),
        ..Default::default()
    };
    let mut attack = AttackStrategy::projectile(settings);
    attack.enter();
    let me = FixedVec2::ZERO;

    let mut shots = 0;
    for _ in 0..100 {
        let tick = attack.tick(&mut h.ctx(me, seen(me, v(2.0, 0.0))));
        if let Some(AttackKind::Projectile { direction, speed, .. }) = tick.attack {
            assert_eq!(direction, v(1.0, 0.0));
            assert_eq!(speed, fx(5.0));
            shots += 1;
        }
    }
    assert_eq!(shots, 2, "shot limit caps the engagement");

    // Beyond the exit distance for two seconds (40 ticks of 0.05).
    let far = seen(me, v(5.0, 0.0));
    let mut exits = Vec::new();
    for _ in 0..40 {
        let ctx = h.ctx(me, far);
        exits.push(attack.update_exit(&ctx));
    }
    assert!(exits[..38].iter().all(|e| !e));
    assert!(exits[39]);
}

#[test]
fn gather_attack_joins_and_leaves_squads_through_hooks() {
    let mut h = Harness::new();
    let mut brain = EnemyBrain::new(
        IdleStrategy::StandStill,
        ChaseStrategy::direct(fx(2.0)),
        AttackStrategy::GatherAround(GatherAttack::new(GatherSettings::default())),
    );
    let me = FixedVec2::ZERO;
    brain.tick(&mut h.ctx(me, seen(me, v(3.0, 0.0))));
    brain.tick(&mut h.ctx(me, seen(me, v(1.0, 0.0))));
    assert_eq!(brain.state(), BehaviorState::Attack);
    assert_eq!(h.squads.membership_of(AgentId(0)), Some(TargetId(1)));
    assert_eq!(brain.attack.gather().and_then(|g| g.slot_index()), Some(0));

    brain.tick(&mut h.ctx(me, Perception::default()));
    assert_eq!(brain.state(), BehaviorState::Idle);
    assert_eq!(h.squads.membership_of(AgentId(0)), None, "exit hook leaves the squad");
}

#[test]
fn destroyed_target_disbands_gather_state() {
    let mut h = Harness::new();
    let mut attack = AttackStrategy::GatherAround(GatherAttack::new(GatherSettings::default()));
    attack.enter();
    let me = FixedVec2::ZERO;
    attack.tick(&mut h.ctx(me, seen(me, v(1.0, 0.0))));
    assert_eq!(attack.gather().and_then(|g| g.joined_target()), Some(TargetId(1)));

    h.squads.target_destroyed(TargetId(1));
    attack.target_destroyed(TargetId(1));
    assert_eq!(attack.gather().and_then(|g| g.joined_target()), None);
    assert_eq!(attack.gather().and_then(|g| g.slot_index()), None);
}
