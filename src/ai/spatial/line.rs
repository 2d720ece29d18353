use super::grid::{Cell, GridSpec};
use super::obstacles::Occupancy;
use crate::ai::fixed_math::{FixedNum, FixedVec2};

/// Integer line between two cells, both endpoints included.
#[derive(Clone, Debug)]
pub struct BresenhamLine {
    current: Cell,
    end: Cell,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl BresenhamLine {
    pub fn new(start: Cell, end: Cell) -> Self {
        let dx = (end.x - start.x).abs();
        let dy = -(end.y - start.y).abs();
        Self {
            current: start,
            end,
            dx,
            dy,
            sx: if start.x < end.x { 1 } else { -1 },
            sy: if start.y < end.y { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.done {
            return None;
        }
        let cell = self.current;
        if cell == self.end {
            self.done = true;
            return Some(cell);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.current.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.current.y += self.sy;
        }
        Some(cell)
    }
}

/// Discretized line-of-sight: walk the Bresenham cells between two points
/// and probe a small circle at every interior cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineOfSightProbe {
    pub grid: GridSpec,
    pub probe_radius: FixedNum,
}

impl Default for LineOfSightProbe {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            probe_radius: FixedNum::from_num(0.4),
        }
    }
}

impl LineOfSightProbe {
    /// True when any interior sample overlaps an obstacle. Endpoints are
    /// never probed, so agents standing against a wall can still see out.
    pub fn occluded<O: Occupancy + ?Sized>(&self, from: FixedVec2, to: FixedVec2, obstacles: &O) -> bool {
        let start = self.grid.world_to_cell(from);
        let end = self.grid.world_to_cell(to);
        BresenhamLine::new(start, end)
            .filter(|cell| *cell != start && *cell != end)
            .any(|cell| obstacles.overlaps_circle(self.grid.cell_to_world(cell), self.probe_radius))
    }

    pub fn has_line_of_sight<O: Occupancy + ?Sized>(&self, from: FixedVec2, to: FixedVec2, obstacles: &O) -> bool {
        !self.occluded(from, to, obstacles)
    }
}
