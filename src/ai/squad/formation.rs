use std::f64::consts::TAU;

use crate::ai::fixed_math::{move_towards, FixedNum, FixedVec2};

/// Minimum gap kept between the desired and minimum ring radius.
const RING_GAP: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingSettings {
    pub desired_radius: FixedNum,
    pub min_radius: FixedNum,
    /// Units per second the ring contracts toward `min_radius`.
    pub shrink_speed: FixedNum,
}

impl Default for RingSettings {
    fn default() -> Self {
        Self {
            desired_radius: FixedNum::from_num(3),
            min_radius: FixedNum::from_num(1.2),
            shrink_speed: FixedNum::from_num(0.4),
        }
    }
}

impl RingSettings {
    /// Non-negative values with `desired >= min + gap`.
    pub fn sanitized(self) -> Self {
        let min_radius = self.min_radius.max(FixedNum::ZERO);
        Self {
            min_radius,
            desired_radius: self.desired_radius.max(min_radius + FixedNum::from_num(RING_GAP)),
            shrink_speed: self.shrink_speed.max(FixedNum::ZERO),
        }
    }
}

/// Radius of the ring an agent is currently holding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingFormation {
    radius: FixedNum,
}

impl RingFormation {
    pub fn new(settings: &RingSettings) -> Self {
        Self {
            radius: settings.sanitized().desired_radius,
        }
    }

    pub fn radius(&self) -> FixedNum {
        self.radius
    }

    pub fn reset(&mut self, settings: &RingSettings) {
        self.radius = settings.sanitized().desired_radius;
    }

    /// Contract toward the minimum radius by at most `shrink_speed * dt`,
    /// staying inside `[min, desired]`.
    pub fn ease(&mut self, settings: &RingSettings, dt: FixedNum) -> FixedNum {
        let s = settings.sanitized();
        let step = s.shrink_speed * dt.max(FixedNum::ZERO);
        self.radius = move_towards(self.radius, s.min_radius, step).clamp(s.min_radius, s.desired_radius);
        self.radius
    }
}

/// Angle of slot `index` in a ring of `squad_size` evenly spaced slots.
pub fn slot_angle(squad_size: usize, index: usize) -> f64 {
    TAU / squad_size.max(1) as f64 * index as f64
}

pub fn slot_target(center: FixedVec2, squad_size: usize, index: usize, radius: FixedNum) -> FixedVec2 {
    center + FixedVec2::from_angle(slot_angle(squad_size, index)) * radius
}
