use rand::Rng;

use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::spatial::Occupancy;

/// Short-range probe lengths for local obstacle avoidance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AvoidanceProbe {
    pub forward: FixedNum,
    /// Sideways component mixed into the two diagonal probes.
    pub side: FixedNum,
    pub gain: FixedNum,
}

impl Default for AvoidanceProbe {
    fn default() -> Self {
        Self {
            forward: FixedNum::from_num(0.9),
            side: FixedNum::from_num(0.5),
            gain: FixedNum::from_num(0.9),
        }
    }
}

/// Perturb `desired` away from whatever the forward probe hits.
///
/// With the forward ray clear the direction passes through unchanged
/// (normalized). When blocked, steer toward the clear diagonal; if both or
/// neither diagonal is clear, pick a side at random.
pub fn steer_with_avoidance<O, R>(
    position: FixedVec2,
    desired: FixedVec2,
    probe: &AvoidanceProbe,
    obstacles: &O,
    rng: &mut R,
) -> FixedVec2
where
    O: Occupancy + ?Sized,
    R: Rng,
{
    let direction = desired.normalize();
    if direction.is_zero() {
        return FixedVec2::ZERO;
    }
    if !obstacles.raycast(position, direction, probe.forward) {
        return direction;
    }

    let left = direction.perp();
    let left_probe = (direction + left * probe.side).normalize();
    let right_probe = (direction - left * probe.side).normalize();
    let left_blocked = obstacles.raycast(position, left_probe, probe.forward);
    let right_blocked = obstacles.raycast(position, right_probe, probe.forward);

    let steer_left = match (left_blocked, right_blocked) {
        (true, false) => false,
        (false, true) => true,
        _ => rng.random_bool(0.5),
    };
    let lateral = if steer_left { left } else { -left };
    (direction + lateral * probe.gain).normalize()
}

/// Proportional-derivative orbit gains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrbitGains {
    pub tangential_speed: FixedNum,
    pub kp: FixedNum,
    pub kd: FixedNum,
}

impl Default for OrbitGains {
    fn default() -> Self {
        Self {
            tangential_speed: FixedNum::from_num(2.2),
            kp: FixedNum::from_num(2),
            kd: FixedNum::from_num(0.6),
        }
    }
}

/// Direction that circles `center` while holding `radius`.
///
/// The radial term pulls inward when too far and pushes outward when too
/// close, damped by the current radial velocity and capped at `max_radial`.
pub fn orbit_direction(
    position: FixedVec2,
    velocity: FixedVec2,
    center: FixedVec2,
    radius: FixedNum,
    clockwise: bool,
    gains: &OrbitGains,
    max_radial: FixedNum,
) -> FixedVec2 {
    let offset = position - center;
    let distance = offset.length();
    let normal = if distance == FixedNum::ZERO {
        FixedVec2::new(FixedNum::from_num(1), FixedNum::ZERO)
    } else {
        offset / distance
    };
    let tangent = if clockwise { -normal.perp() } else { normal.perp() };
    let error = distance - radius;
    let radial = (-(gains.kp * error) - gains.kd * velocity.dot(normal)).clamp(-max_radial, max_radial);
    tangent * gains.tangential_speed + normal * radial
}
