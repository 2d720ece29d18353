use bevy::prelude::*;

use super::shapes::ObstacleShape;
use crate::ai::fixed_math::{FixedNum, FixedVec2};

/// Occupancy queries the AI core needs from the collision world.
///
/// `Option<&T>` implements the trait as well: a missing layer answers every
/// query with "free", so perception and movement keep running without
/// collision data.
pub trait Occupancy {
    fn overlaps_box(&self, center: FixedVec2, half_extents: FixedVec2) -> bool;
    fn overlaps_circle(&self, center: FixedVec2, radius: FixedNum) -> bool;
    fn segment_blocked(&self, from: FixedVec2, to: FixedVec2) -> bool;

    /// Bumped whenever the geometry changes; caches compare against it.
    fn generation(&self) -> u64 {
        0
    }

    fn raycast(&self, origin: FixedVec2, direction: FixedVec2, max_distance: FixedNum) -> bool {
        self.segment_blocked(origin, origin + direction.normalize() * max_distance)
    }
}

impl<T: Occupancy + ?Sized> Occupancy for Option<&T> {
    fn overlaps_box(&self, center: FixedVec2, half_extents: FixedVec2) -> bool {
        match self {
            Some(layer) => layer.overlaps_box(center, half_extents),
            None => false,
        }
    }

    fn overlaps_circle(&self, center: FixedVec2, radius: FixedNum) -> bool {
        match self {
            Some(layer) => layer.overlaps_circle(center, radius),
            None => false,
        }
    }

    fn segment_blocked(&self, from: FixedVec2, to: FixedVec2) -> bool {
        match self {
            Some(layer) => layer.segment_blocked(from, to),
            None => false,
        }
    }

    fn generation(&self) -> u64 {
        match self {
            Some(layer) => layer.generation(),
            None => 0,
        }
    }
}

/// Handle returned by [`ObstacleLayer::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObstacleId(pub u32);

/// The static obstacle layer, treated as immutable for the duration of a tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleLayer {
    shapes: Vec<(ObstacleId, ObstacleShape)>,
    next_id: u32,
    generation: u64,
}

impl ObstacleLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shapes(shapes: impl IntoIterator<Item = ObstacleShape>) -> Self {
        let mut layer = Self::new();
        for shape in shapes {
            layer.insert(shape);
        }
        layer
    }

    pub fn insert(&mut self, shape: ObstacleShape) -> ObstacleId {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        self.shapes.push((id, shape));
        self.generation += 1;
        id
    }

    pub fn remove(&mut self, id: ObstacleId) -> bool {
        let before = self.shapes.len();
        self.shapes.retain(|(existing, _)| *existing != id);
        let removed = self.shapes.len() != before;
        if removed {
            self.generation += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.shapes.is_empty() {
            self.shapes.clear();
            self.generation += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> impl Iterator<Item = &ObstacleShape> {
        self.shapes.iter().map(|(_, shape)| shape)
    }

    pub fn contains_point(&self, point: FixedVec2) -> bool {
        self.shapes().any(|s| s.contains_point(point))
    }
}

impl Occupancy for ObstacleLayer {
    fn overlaps_box(&self, center: FixedVec2, half_extents: FixedVec2) -> bool {
        self.shapes().any(|s| s.overlaps_box(center, half_extents))
    }

    fn overlaps_circle(&self, center: FixedVec2, radius: FixedNum) -> bool {
        self.shapes().any(|s| s.overlaps_circle(center, radius))
    }

    fn segment_blocked(&self, from: FixedVec2, to: FixedVec2) -> bool {
        self.shapes().any(|s| s.intersects_segment(from, to))
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
