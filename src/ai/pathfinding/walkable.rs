use rustc_hash::FxHashMap;

use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::spatial::{Cell, GridSpec, Occupancy};

/// Footprint used to decide whether an agent fits in a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footprint {
    /// Fraction of the cell the agent must be able to occupy.
    pub occupancy_fraction: FixedNum,
    pub agent_radius: FixedNum,
}

impl Default for Footprint {
    fn default() -> Self {
        Self {
            occupancy_fraction: FixedNum::from_num(0.8),
            agent_radius: FixedNum::from_num(0.25),
        }
    }
}

impl Footprint {
    pub fn half_extents(&self, grid: &GridSpec) -> FixedVec2 {
        let side = grid.cell_size * self.occupancy_fraction + self.agent_radius * FixedNum::from_num(2);
        let half = side / FixedNum::from_num(2);
        FixedVec2::new(half, half)
    }
}

/// Memoized walkability answers, valid for one obstacle-layer generation.
#[derive(Clone, Debug, Default)]
pub struct WalkabilityCache {
    generation: Option<u64>,
    cells: FxHashMap<Cell, bool>,
}

impl WalkabilityCache {
    /// Drop every memoized answer if the layer changed since they were computed.
    pub fn sync<O: Occupancy + ?Sized>(&mut self, obstacles: &O) {
        let current = obstacles.generation();
        if self.generation != Some(current) {
            self.cells.clear();
            self.generation = Some(current);
        }
    }

    pub fn invalidate(&mut self) {
        self.cells.clear();
        self.generation = None;
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Box-overlap test of the footprint centred on `cell`.
    pub fn is_walkable<O: Occupancy + ?Sized>(
        &mut self,
        cell: Cell,
        grid: &GridSpec,
        footprint: &Footprint,
        obstacles: &O,
    ) -> bool {
        *self.cells.entry(cell).or_insert_with(|| {
            !obstacles.overlaps_box(grid.cell_to_world(cell), footprint.half_extents(grid))
        })
    }
}
