use std::collections::BTreeMap;

use bevy::prelude::*;
use fixedbitset::FixedBitSet;

use super::grid::{Cell, GridSpec};
use super::obstacles::Occupancy;
use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::targeting::TargetId;

/// Counters from the last rebuild, kept for debug overlays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibilityStats {
    pub visible: usize,
    pub skipped_by_distance: usize,
    pub blocked: usize,
}

/// Snapshot of which lattice dots around a focal point have a clear line
/// back to it. Rebuilt wholesale; never patched in place.
#[derive(Clone, Debug)]
pub struct VisibilityGrid {
    focus: FixedVec2,
    radius: FixedNum,
    grid: GridSpec,
    center: Cell,
    half: i32,
    visible: FixedBitSet,
    stats: VisibilityStats,
    obstacle_generation: u64,
}

impl VisibilityGrid {
    /// Every dot within `radius` of `focus` whose segment back to `focus` is clear.
    pub fn build<O: Occupancy + ?Sized>(focus: FixedVec2, radius: FixedNum, spacing: FixedNum, obstacles: &O) -> Self {
        let grid = GridSpec::new(spacing);
        let center = grid.world_to_cell(focus);
        let half = if spacing > FixedNum::ZERO {
            (radius / spacing).ceil().to_num::<i32>().max(0)
        } else {
            0
        };
        let side = (2 * half + 1) as usize;
        let mut visible = FixedBitSet::with_capacity(side * side);
        let mut stats = VisibilityStats::default();
        let radius_sq = radius * radius;

        for dy in -half..=half {
            for dx in -half..=half {
                let cell = center.offset(dx, dy);
                let dot = grid.cell_to_world(cell);
                if dot.distance_squared(focus) > radius_sq {
                    stats.skipped_by_distance += 1;
                    continue;
                }
                if obstacles.segment_blocked(focus, dot) {
                    stats.blocked += 1;
                    continue;
                }
                visible.insert(Self::index_of(half, dx, dy));
                stats.visible += 1;
            }
        }

        Self {
            focus,
            radius,
            grid,
            center,
            half,
            visible,
            stats,
            obstacle_generation: obstacles.generation(),
        }
    }

    fn index_of(half: i32, dx: i32, dy: i32) -> usize {
        let side = 2 * half + 1;
        ((dy + half) * side + (dx + half)) as usize
    }

    pub fn focus(&self) -> FixedVec2 {
        self.focus
    }

    pub fn radius(&self) -> FixedNum {
        self.radius
    }

    pub fn stats(&self) -> VisibilityStats {
        self.stats
    }

    pub fn obstacle_generation(&self) -> u64 {
        self.obstacle_generation
    }

    pub fn is_visible(&self, cell: Cell) -> bool {
        let dx = cell.x - self.center.x;
        let dy = cell.y - self.center.y;
        if dx.abs() > self.half || dy.abs() > self.half {
            return false;
        }
        self.visible.contains(Self::index_of(self.half, dx, dy))
    }

    pub fn is_visible_world(&self, point: FixedVec2) -> bool {
        self.is_visible(self.grid.world_to_cell(point))
    }

    /// Visible cells in row-major order.
    pub fn visible_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let side = (2 * self.half + 1) as usize;
        self.visible.ones().map(move |index| {
            let dx = (index % side) as i32 - self.half;
            let dy = (index / side) as i32 - self.half;
            self.center.offset(dx, dy)
        })
    }

    pub fn visible_dots(&self) -> impl Iterator<Item = FixedVec2> + '_ {
        self.visible_cells().map(|cell| self.grid.cell_to_world(cell))
    }
}

/// Per-target visibility snapshots, rebuilt at most once per tick.
#[derive(Resource, Debug, Default)]
pub struct VisibilityCache {
    entries: BTreeMap<TargetId, (u64, VisibilityGrid)>,
}

impl VisibilityCache {
    /// Returns the grid for `target`, rebuilding when it is from another
    /// tick, centred elsewhere, or built against older geometry.
    pub fn get_or_build<O: Occupancy + ?Sized>(
        &mut self,
        target: TargetId,
        focus: FixedVec2,
        radius: FixedNum,
        spacing: FixedNum,
        tick: u64,
        obstacles: &O,
    ) -> &VisibilityGrid {
        let generation = obstacles.generation();
        let entry = self
            .entries
            .entry(target)
            .or_insert_with(|| (tick, VisibilityGrid::build(focus, radius, spacing, obstacles)));
        let stale = entry.0 != tick
            || entry.1.focus != focus
            || entry.1.radius != radius
            || entry.1.obstacle_generation != generation;
        if stale {
            *entry = (tick, VisibilityGrid::build(focus, radius, spacing, obstacles));
        }
        &entry.1
    }

    pub fn get(&self, target: TargetId) -> Option<&VisibilityGrid> {
        self.entries.get(&target).map(|(_, grid)| grid)
    }

    pub fn forget(&mut self, target: TargetId) {
        self.entries.remove(&target);
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
    }
}
