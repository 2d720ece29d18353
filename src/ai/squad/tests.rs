use std::collections::BTreeSet;

use super::*;
use crate::ai::fixed_math::{fx, FixedNum, FixedVec2};
use crate::ai::simulation::AgentId;
use crate::ai::targeting::TargetId;

fn v(x: f64, y: f64) -> FixedVec2 {
    FixedVec2::new(fx(x), fx(y))
}

fn assert_permutation(registry: &mut SquadRegistry, target: TargetId, members: &BTreeSet<AgentId>) {
    let size = registry.squad_size(target);
    assert_eq!(size, members.len());
    let slots: BTreeSet<usize> = members.iter().map(|a| registry.slot_of(target, *a)).collect();
    assert_eq!(slots, (0..size).collect::<BTreeSet<_>>());
}

#[test]
fn slots_stay_a_permutation_under_churn() {
    let mut rng = fastrand::Rng::with_seed(99);
    let target = TargetId(1);
    let mut registry = SquadRegistry::default();
    let mut members = BTreeSet::new();
    for _ in 0..300 {
        let agent = AgentId(rng.u32(0..24));
        match rng.u8(0..4) {
            0 | 1 => {
                registry.join(target, agent);
                members.insert(agent);
            }
            2 => {
                registry.leave(target, agent);
                members.remove(&agent);
            }
            _ => {
                registry.agent_destroyed(agent);
                members.remove(&agent);
            }
        }
        if !members.is_empty() {
            assert_permutation(&mut registry, target, &members);
        }
    }
}

#[test]
fn slots_follow_identity_order() {
    let target = TargetId(3);
    let mut registry = SquadRegistry::default();
    for id in [9, 2, 5] {
        registry.join(target, AgentId(id));
    }
    assert_eq!(registry.slot_of(target, AgentId(2)), 0);
    assert_eq!(registry.slot_of(target, AgentId(5)), 1);
    assert_eq!(registry.slot_of(target, AgentId(9)), 2);
}

#[test]
fn rejoin_is_a_noop() {
    let target = TargetId(0);
    let mut registry = SquadRegistry::default();
    assert!(registry.join(target, AgentId(1)));
    registry.slot_of(target, AgentId(1));
    let generation = registry.squad(target).map(|s| s.generation());
    assert!(!registry.join(target, AgentId(1)));
    assert_eq!(registry.squad(target).map(|s| s.generation()), generation);
    assert!(!registry.squad(target).is_some_and(|s| s.is_dirty()));
}

#[test]
fn fresh_member_gets_slot_in_same_tick() {
    let target = TargetId(0);
    let mut registry = SquadRegistry::default();
    registry.join(target, AgentId(5));
    assert_eq!(registry.slot_of(target, AgentId(5)), 0);
    registry.join(target, AgentId(1));
    assert_eq!(registry.peek_slot(target, AgentId(1)), None, "dirty squads hide stale slots");
    assert_eq!(registry.slot_of(target, AgentId(1)), 0);
    assert_eq!(registry.slot_of(target, AgentId(5)), 1);
}

#[test]
fn non_member_slot_request_self_heals() {
    let target = TargetId(4);
    let mut registry = SquadRegistry::default();
    registry.join(target, AgentId(1));
    let slot = registry.slot_of(target, AgentId(7));
    assert_eq!(slot, 1);
    assert!(registry.squad(target).is_some_and(|s| s.contains(AgentId(7))));
}

#[test]
fn destroyed_members_drop_out_lazily() {
    let target = TargetId(2);
    let mut registry = SquadRegistry::default();
    for id in 0..4 {
        registry.join(target, AgentId(id));
    }
    assert_eq!(registry.squad_size(target), 4);
    registry.agent_destroyed(AgentId(1));
    assert!(registry.squad(target).is_some_and(|s| s.contains(AgentId(1))), "still listed until reindex");
    assert_eq!(registry.squad_size(target), 3);
    assert_eq!(registry.slot_of(target, AgentId(3)), 2);
}

#[test]
fn destroyed_sole_member_drops_its_squad() {
    let target = TargetId(6);
    let mut registry = SquadRegistry::default();
    registry.join(target, AgentId(4));
    assert_eq!(registry.slot_of(target, AgentId(4)), 0);

    registry.agent_destroyed(AgentId(4));

    assert_eq!(registry.squad_count(), 0);
    assert_eq!(registry.membership_of(AgentId(4)), None);
    assert_eq!(registry.pending_destroyed(), 0);
}

#[test]
fn destroyed_set_is_drained_by_reindex() {
    let target = TargetId(6);
    let mut registry = SquadRegistry::default();
    for id in 0..3 {
        registry.join(target, AgentId(id));
    }
    registry.agent_destroyed(AgentId(0));
    registry.agent_destroyed(AgentId(2));
    assert_eq!(registry.pending_destroyed(), 2);
    assert_eq!(registry.membership_of(AgentId(2)), None);

    assert_eq!(registry.squad_size(target), 1);
    assert_eq!(registry.pending_destroyed(), 0);

    // Destroying an agent no squad lists records nothing.
    registry.agent_destroyed(AgentId(17));
    assert_eq!(registry.pending_destroyed(), 0);
}

#[test]
fn destroyed_target_disbands_squad() {
    let target = TargetId(8);
    let mut registry = SquadRegistry::default();
    registry.join(target, AgentId(1));
    registry.join(target, AgentId(2));
    let members = registry.target_destroyed(target);
    assert_eq!(members, vec![AgentId(1), AgentId(2)]);
    assert!(registry.squad(target).is_none());
    assert_eq!(registry.squad_size(target), 0);
}

#[test]
fn empty_squad_is_removed_on_last_leave() {
    let target = TargetId(8);
    let mut registry = SquadRegistry::default();
    registry.join(target, AgentId(1));
    assert!(registry.leave(target, AgentId(1)));
    assert_eq!(registry.squad_count(), 0);
    assert_eq!(registry.membership_of(AgentId(1)), None);
}

// ============================================================================
// Ring formation
// ============================================================================

#[test]
fn four_slot_ring_geometry() {
    let angles: Vec<f64> = (0..4).map(|i| slot_angle(4, i).to_degrees()).collect();
    for (angle, expected) in angles.iter().zip([0.0, 90.0, 180.0, 270.0]) {
        assert!((angle - expected).abs() < 1e-9, "{angle} vs {expected}");
    }
    let center = v(10.0, -2.0);
    assert_eq!(slot_target(center, 4, 2, fx(3.0)), center + v(-3.0, 0.0));
    assert_eq!(slot_target(center, 4, 0, fx(3.0)), center + v(3.0, 0.0));
}

#[test]
fn ring_eases_within_bounds_at_bounded_rate() {
    let settings = RingSettings::default();
    let mut ring = RingFormation::new(&settings);
    assert_eq!(ring.radius(), fx(3.0));
    let dt = fx(0.1);
    let max_step = settings.shrink_speed * dt;
    let mut previous = ring.radius();
    for _ in 0..200 {
        let radius = ring.ease(&settings, dt);
        assert!(radius >= settings.min_radius && radius <= settings.desired_radius);
        assert!((previous - radius).abs() <= max_step);
        previous = radius;
    }
    assert_eq!(ring.radius(), settings.min_radius);
    ring.reset(&settings);
    assert_eq!(ring.radius(), settings.desired_radius);
}

#[test]
fn inverted_ring_settings_are_sanitized() {
    let settings = RingSettings {
        desired_radius: fx(1.0),
        min_radius: fx(2.0),
        shrink_speed: fx(-1.0),
    }
    .sanitized();
    assert_eq!(settings.desired_radius, fx(2.0) + fx(0.05));
    assert_eq!(settings.shrink_speed, FixedNum::ZERO);
}

// ============================================================================
// Steering
// ============================================================================

fn mate(id: u32, x: f64, y: f64) -> Mate {
    Mate {
        id: AgentId(id),
        position: v(x, y),
        velocity: FixedVec2::ZERO,
    }
}

#[test]
fn separation_pushes_away_from_close_mates() {
    let mates = [mate(0, 0.0, 0.0), mate(1, 0.4, 0.0)];
    let terms = SteeringTerms::compute(AgentId(0), v(0.0, 0.0), &mates, v(0.0, 5.0), fx(3.0), &FlockSettings::default());
    assert!(terms.separation.x < FixedNum::ZERO);
    assert_eq!(terms.slot, v(0.0, 1.0));
}

#[test]
fn combined_steering_is_clamped() {
    let settings = FlockSettings::default();
    let mates = [mate(1, 0.01, 0.0)];
    let terms = SteeringTerms::compute(AgentId(0), v(0.0, 0.0), &mates, v(5.0, 0.0), fx(3.0), &settings);
    assert!(terms.combine(&settings).length() <= settings.max_speed + fx(0.001));
}

#[test]
fn alignment_follows_neighbour_heading() {
    let mut moving = mate(1, 1.0, 1.0);
    moving.velocity = v(0.0, -2.0);
    let terms = SteeringTerms::compute(AgentId(0), v(0.0, 0.0), &[moving], v(3.0, 0.0), fx(3.0), &FlockSettings::default());
    assert_eq!(terms.alignment, v(0.0, -1.0));
    assert!(terms.cohesion.x > FixedNum::ZERO && terms.cohesion.y > FixedNum::ZERO);
}

// ============================================================================
// Gather coordinator
// ============================================================================

#[test]
fn gather_moves_toward_slot_then_strikes() {
    let mut squads = SquadRegistry::default();
    let mates = MateSnapshot::new();
    let settings = GatherSettings::default();
    let mut gather = GatherAttack::new(settings);
    gather.enter();

    let target = (TargetId(0), v(0.0, 0.0));
    let far = gather.tick(&mut squads, GatherInput {
        agent: AgentId(0),
        position: v(8.0, 0.0),
        target: Some(target),
        mates: &mates,
        dt: fx(0.05),
    });
    assert!(!far.attack_ready);
    assert!(far.velocity.x < FixedNum::ZERO, "seeks the slot at +x");
    assert_eq!(gather.slot_index(), Some(0));

    // Let the ring contract to its minimum, then stand in the slot.
    for _ in 0..200 {
        gather.tick(&mut squads, GatherInput {
            agent: AgentId(0),
            position: v(8.0, 0.0),
            target: Some(target),
            mates: &mates,
            dt: fx(0.05),
        });
    }
    assert_eq!(gather.ring_radius(), settings.ring.min_radius);
    let slot = gather.slot_target().expect("slot assigned");
    let ready = gather.tick(&mut squads, GatherInput {
        agent: AgentId(0),
        position: slot,
        target: Some(target),
        mates: &mates,
        dt: fx(0.05),
    });
    assert!(ready.attack_ready);
    assert!(ready.strike);
    assert_eq!(ready.velocity, FixedVec2::ZERO);

    let cooling = gather.tick(&mut squads, GatherInput {
        agent: AgentId(0),
        position: slot,
        target: Some(target),
        mates: &mates,
        dt: fx(0.05),
    });
    assert!(cooling.attack_ready && !cooling.strike);
}

#[test]
fn gather_without_target_leaves_squad() {
    let mut squads = SquadRegistry::default();
    let mates = MateSnapshot::new();
    let mut gather = GatherAttack::new(GatherSettings::default());
    let snapshot = &mates;
    let input = move |target| GatherInput {
        agent: AgentId(3),
        position: v(1.0, 1.0),
        target,
        mates: snapshot,
        dt: fx(0.05),
    };
    gather.tick(&mut squads, input(Some((TargetId(1), v(0.0, 0.0)))));
    assert_eq!(squads.membership_of(AgentId(3)), Some(TargetId(1)));

    gather.tick(&mut squads, input(Some((TargetId(2), v(0.0, 0.0)))));
    assert_eq!(squads.membership_of(AgentId(3)), Some(TargetId(2)), "switching targets leaves the old squad");

    let idle = gather.tick(&mut squads, input(None));
    assert_eq!(idle, GatherOutput::default());
    assert_eq!(squads.membership_of(AgentId(3)), None);
}
