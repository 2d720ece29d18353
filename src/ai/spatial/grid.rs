use serde::{Deserialize, Serialize};

use crate::ai::fixed_math::{FixedNum, FixedVec2};

/// Largest cell coordinate `world_to_cell` produces; leaves headroom for
/// neighbour offsets and search windows.
pub const MAX_CELL: i32 = i32::MAX / 4;

/// Integer lattice coordinate. The lattice is unbounded; searches impose
/// their own window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// Max of the axis distances (ring index around `other`).
    pub fn chebyshev(self, other: Cell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Mapping between world space and the uniform lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSpec {
    pub cell_size: FixedNum,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { cell_size: FixedNum::from_num(1) }
    }
}

impl GridSpec {
    pub fn new(cell_size: FixedNum) -> Self {
        Self { cell_size }
    }

    /// Nearest lattice cell (rounded, not floored).
    ///
    /// Coordinates saturate at ±[`MAX_CELL`], which lies outside every
    /// search window and obstacle.
    pub fn world_to_cell(&self, world: FixedVec2) -> Cell {
        Cell::new(self.axis_to_cell(world.x), self.axis_to_cell(world.y))
    }

    fn axis_to_cell(&self, value: FixedNum) -> i32 {
        let scaled = if self.cell_size <= FixedNum::ZERO {
            value
        } else {
            value.saturating_div(self.cell_size)
        };
        scaled
            .saturating_round()
            .saturating_to_num::<i32>()
            .clamp(-MAX_CELL, MAX_CELL)
    }

    /// Centre of `cell` in world space.
    pub fn cell_to_world(&self, cell: Cell) -> FixedVec2 {
        FixedVec2::new(
            FixedNum::from_num(cell.x).saturating_mul(self.cell_size),
            FixedNum::from_num(cell.y).saturating_mul(self.cell_size),
        )
    }
}
