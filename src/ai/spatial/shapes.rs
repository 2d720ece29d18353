use serde::{Deserialize, Serialize};

use crate::ai::fixed_math::{FixedNum, FixedVec2};

/// Static blocking geometry in world space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleShape {
    Circle { center: FixedVec2, radius: FixedNum },
    /// Axis-aligned rectangle, `min` <= `max` component-wise.
    Rect { min: FixedVec2, max: FixedVec2 },
}

impl ObstacleShape {
    pub fn circle(center: FixedVec2, radius: FixedNum) -> Self {
        Self::Circle { center, radius }
    }

    /// Rectangle from a centre and half extents.
    pub fn rect(center: FixedVec2, half_extents: FixedVec2) -> Self {
        Self::Rect {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn contains_point(&self, point: FixedVec2) -> bool {
        match *self {
            Self::Circle { center, radius } => point.distance_squared(center) < radius * radius,
            Self::Rect { min, max } => {
                point.x > min.x && point.x < max.x && point.y > min.y && point.y < max.y
            }
        }
    }

    /// Overlap with an axis-aligned box. Touching edges do not count.
    pub fn overlaps_box(&self, center: FixedVec2, half_extents: FixedVec2) -> bool {
        let bmin = center - half_extents;
        let bmax = center + half_extents;
        match *self {
            Self::Circle { center: c, radius } => {
                let closest = FixedVec2::new(c.x.clamp(bmin.x, bmax.x), c.y.clamp(bmin.y, bmax.y));
                closest.distance_squared(c) < radius * radius
            }
            Self::Rect { min, max } => {
                min.x < bmax.x && max.x > bmin.x && min.y < bmax.y && max.y > bmin.y
            }
        }
    }

    pub fn overlaps_circle(&self, center: FixedVec2, radius: FixedNum) -> bool {
        match *self {
            Self::Circle { center: c, radius: r } => {
                let reach = r + radius;
                center.distance_squared(c) < reach * reach
            }
            Self::Rect { min, max } => {
                let closest = FixedVec2::new(center.x.clamp(min.x, max.x), center.y.clamp(min.y, max.y));
                closest.distance_squared(center) < radius * radius
            }
        }
    }

    /// Whether the segment `a`..`b` touches the shape's interior.
    pub fn intersects_segment(&self, a: FixedVec2, b: FixedVec2) -> bool {
        match *self {
            Self::Circle { center, radius } => {
                let closest = closest_point_on_segment(a, b, center);
                closest.distance_squared(center) < radius * radius
            }
            Self::Rect { min, max } => segment_hits_rect(a, b, min, max),
        }
    }
}

pub fn closest_point_on_segment(a: FixedVec2, b: FixedVec2, point: FixedVec2) -> FixedVec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == FixedNum::ZERO {
        return a;
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(FixedNum::ZERO, FixedNum::from_num(1));
    a + ab * t
}

/// Slab test clipped to the segment's parameter range.
fn segment_hits_rect(a: FixedVec2, b: FixedVec2, min: FixedVec2, max: FixedVec2) -> bool {
    let d = b - a;
    let mut t_enter = FixedNum::ZERO;
    let mut t_exit = FixedNum::from_num(1);

    for (origin, delta, lo, hi) in [(a.x, d.x, min.x, max.x), (a.y, d.y, min.y, max.y)] {
        if delta == FixedNum::ZERO {
            if origin <= lo || origin >= hi {
                return false;
            }
            continue;
        }
        let mut t0 = (lo - origin) / delta;
        let mut t1 = (hi - origin) / delta;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter >= t_exit {
            return false;
        }
    }
    true
}
