//! Target registry and target selection.
//!
//! Players (or anything else enemies may fight) are tracked in an arena of
//! stable [`TargetId`]s so squads and caches can key on an id that outlives
//! the entity that carried it.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::fixed_math::{FixedNum, FixedVec2};

/// Stable identity of something agents can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Marks an entity as targetable.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub id: TargetId,
}

/// Per-tick view of a target as the AI core sees it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    pub id: TargetId,
    pub position: FixedVec2,
    pub velocity: FixedVec2,
    pub health: FixedNum,
}

impl TargetSnapshot {
    pub fn is_alive(&self) -> bool {
        self.health > FixedNum::ZERO
    }
}

/// Registry of every live target, refreshed from the ECS each tick.
#[derive(Resource, Debug, Default)]
pub struct TargetRegistry {
    next_id: u32,
    targets: BTreeMap<TargetId, TargetSnapshot>,
}

impl TargetRegistry {
    /// Reserve a fresh id. Ids are never reused.
    pub fn allocate(&mut self) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn upsert(&mut self, snapshot: TargetSnapshot) {
        if snapshot.id.0 >= self.next_id {
            self.next_id = snapshot.id.0 + 1;
        }
        self.targets.insert(snapshot.id, snapshot);
    }

    pub fn remove(&mut self, id: TargetId) -> Option<TargetSnapshot> {
        self.targets.remove(&id)
    }

    /// Drop every target not in `live`.
    pub fn retain(&mut self, mut live: impl FnMut(TargetId) -> bool) {
        self.targets.retain(|id, _| live(*id));
    }

    pub fn get(&self, id: TargetId) -> Option<&TargetSnapshot> {
        self.targets.get(&id)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetSnapshot> {
        self.targets.values()
    }

    /// Nearest living target, ignoring range. Ties go to the lower id.
    pub fn closest(&self, from: FixedVec2) -> Option<&TargetSnapshot> {
        self.targets
            .values()
            .filter(|t| t.is_alive())
            .min_by_key(|t| (t.position.distance_squared(from), t.id))
    }

    /// Lowest-health living target within `view_radius` that passes
    /// `visible`; nearer wins among equal health.
    pub fn weakest_in_view(
        &self,
        from: FixedVec2,
        view_radius: FixedNum,
        mut visible: impl FnMut(&TargetSnapshot) -> bool,
    ) -> Option<&TargetSnapshot> {
        let radius_sq = view_radius * view_radius;
        self.targets
            .values()
            .filter(|t| t.is_alive())
            .filter(|t| t.position.distance_squared(from) <= radius_sq)
            .filter(|t| visible(t))
            .min_by_key(|t| (t.health, t.position.distance_squared(from), t.id))
    }

    /// Weakest in view, else closest overall.
    pub fn select_target(
        &self,
        from: FixedVec2,
        view_radius: FixedNum,
        visible: impl FnMut(&TargetSnapshot) -> bool,
    ) -> Option<&TargetSnapshot> {
        self.weakest_in_view(from, view_radius, visible)
            .or_else(|| self.closest(from))
    }
}
