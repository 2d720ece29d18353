use std::collections::BTreeMap;

use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::simulation::AgentId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlockWeights {
    pub separation: FixedNum,
    pub cohesion: FixedNum,
    pub alignment: FixedNum,
    pub slot: FixedNum,
}

impl Default for FlockWeights {
    fn default() -> Self {
        Self {
            separation: FixedNum::from_num(1.5),
            cohesion: FixedNum::from_num(0.6),
            alignment: FixedNum::from_num(0.4),
            slot: FixedNum::from_num(2),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlockSettings {
    pub max_speed: FixedNum,
    pub separation_radius: FixedNum,
    pub slot_arrival_threshold: FixedNum,
    pub weights: FlockWeights,
}

impl Default for FlockSettings {
    fn default() -> Self {
        Self {
            max_speed: FixedNum::from_num(4),
            separation_radius: FixedNum::from_num(0.8),
            slot_arrival_threshold: FixedNum::from_num(1),
            weights: FlockWeights::default(),
        }
    }
}

/// Squad-mate state as of the previous tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mate {
    pub id: AgentId,
    pub position: FixedVec2,
    pub velocity: FixedVec2,
}

/// Last-tick positions and velocities of every agent, keyed by id.
pub type MateSnapshot = BTreeMap<AgentId, Mate>;

/// The four unweighted steering contributions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SteeringTerms {
    pub separation: FixedVec2,
    pub cohesion: FixedVec2,
    pub alignment: FixedVec2,
    pub slot: FixedVec2,
}

impl SteeringTerms {
    pub fn compute<'a>(
        me: AgentId,
        position: FixedVec2,
        mates: impl IntoIterator<Item = &'a Mate>,
        slot_target: FixedVec2,
        ring_radius: FixedNum,
        settings: &FlockSettings,
    ) -> Self {
        let epsilon = FixedNum::from_num(0.0001);
        let separation_sq = settings.separation_radius * settings.separation_radius;
        let neighborhood = ring_radius * FixedNum::from_num(2);
        let neighborhood_sq = neighborhood * neighborhood;

        let mut separation = FixedVec2::ZERO;
        let mut centroid = FixedVec2::ZERO;
        let mut heading = FixedVec2::ZERO;
        let mut neighbors = 0i32;

        for mate in mates {
            if mate.id == me {
                continue;
            }
            let offset = mate.position - position;
            let dist_sq = offset.length_squared();
            if dist_sq < separation_sq {
                // Inverse-distance push: unit direction scaled by 1/dist.
                separation -= offset / dist_sq.max(epsilon);
            }
            if dist_sq <= neighborhood_sq {
                centroid += mate.position;
                heading += mate.velocity;
                neighbors += 1;
            }
        }

        let (cohesion, alignment) = if neighbors > 0 {
            let count = FixedNum::from_num(neighbors);
            ((centroid / count - position).normalize(), (heading / count).normalize())
        } else {
            (FixedVec2::ZERO, FixedVec2::ZERO)
        };

        Self {
            separation,
            cohesion,
            alignment,
            slot: (slot_target - position).normalize(),
        }
    }

    /// Weighted sum, clamped to `max_speed`.
    pub fn combine(&self, settings: &FlockSettings) -> FixedVec2 {
        let w = &settings.weights;
        let sum = self.separation * w.separation
            + self.cohesion * w.cohesion
            + self.alignment * w.alignment
            + self.slot * w.slot;
        sum.clamp_length(settings.max_speed)
    }
}
