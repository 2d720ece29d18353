use bevy::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::heap::IndexedMinHeap;
use crate::ai::fixed_math::{sqrt2, FixedNum};
use crate::ai::spatial::Cell;

const CARDINALS: [(i32, i32); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Inclusive rectangle of cells a single search may touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchWindow {
    pub min: Cell,
    pub max: Cell,
}

impl SearchWindow {
    pub fn around(center: Cell, half_x: i32, half_y: i32) -> Self {
        Self {
            min: center.offset(-half_x, -half_y),
            max: center.offset(half_x, half_y),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    pub fn clamp(&self, cell: Cell) -> Cell {
        Cell::new(cell.x.clamp(self.min.x, self.max.x), cell.y.clamp(self.min.y, self.max.y))
    }

    pub fn cell_count(&self) -> usize {
        let w = (self.max.x - self.min.x + 1).max(0) as usize;
        let h = (self.max.y - self.min.y + 1).max(0) as usize;
        w * h
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchParams {
    pub allow_diagonal: bool,
    /// Expansion budget per search; 0 disables the cap.
    pub max_expanded_nodes: usize,
    pub goal_snap_radius: i32,
    pub start_snap_radius: i32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            max_expanded_nodes: 5000,
            goal_snap_radius: 4,
            start_snap_radius: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    /// Cells from start to goal, both included.
    pub cells: Vec<Cell>,
    pub cost: FixedNum,
    pub expanded: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SearchFailure {
    #[error("expansion budget of {budget} nodes exhausted")]
    BudgetExhausted { budget: usize, expanded: usize },
    #[error("goal unreachable inside the search window after {expanded} expansions")]
    Unreachable { expanded: usize },
}

/// Octile distance with diagonals, Manhattan without.
pub fn heuristic(a: Cell, b: Cell, allow_diagonal: bool) -> FixedNum {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    if allow_diagonal {
        let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
        sqrt2() * FixedNum::from_num(lo) + FixedNum::from_num(hi - lo)
    } else {
        FixedNum::from_num(dx + dy)
    }
}

/// Walkable neighbours of `cell` with their step cost, in a fixed order:
/// up, down, left, right, then diagonals. A diagonal is only offered when
/// both orthogonal cells it squeezes between are walkable.
pub fn collect_neighbors<F: FnMut(Cell) -> bool>(
    cell: Cell,
    window: &SearchWindow,
    allow_diagonal: bool,
    walkable: &mut F,
    out: &mut SmallVec<[(Cell, FixedNum); 8]>,
) {
    let one = FixedNum::from_num(1);
    let mut open = [false; 4];
    for (i, (dx, dy)) in CARDINALS.iter().enumerate() {
        let next = cell.offset(*dx, *dy);
        if window.contains(next) && walkable(next) {
            open[i] = true;
            out.push((next, one));
        }
    }
    if !allow_diagonal {
        return;
    }
    for (dx, dy) in DIAGONALS {
        let next = cell.offset(dx, dy);
        if !window.contains(next) {
            continue;
        }
        let horizontal = if dx > 0 { open[3] } else { open[2] };
        let vertical = if dy > 0 { open[0] } else { open[1] };
        if horizontal && vertical && walkable(next) {
            out.push((next, sqrt2()));
        }
    }
}

/// Expanding square-ring scan for the closest walkable cell inside the window.
pub fn nearest_walkable<F: FnMut(Cell) -> bool>(
    origin: Cell,
    max_radius: i32,
    window: &SearchWindow,
    walkable: &mut F,
) -> Option<Cell> {
    if window.contains(origin) && walkable(origin) {
        return Some(origin);
    }
    for radius in 1..=max_radius.max(0) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                let candidate = origin.offset(dx, dy);
                if window.contains(candidate) && walkable(candidate) {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

/// Plain A* between two cells inside `window`. Neither endpoint is snapped.
pub fn find_path<F: FnMut(Cell) -> bool>(
    start: Cell,
    goal: Cell,
    window: &SearchWindow,
    params: &SearchParams,
    walkable: &mut F,
) -> Result<SearchResult, SearchFailure> {
    let mut open: IndexedMinHeap<Cell> = IndexedMinHeap::new();
    let mut g_score: FxHashMap<Cell, FixedNum> = FxHashMap::default();
    let mut came_from: FxHashMap<Cell, Cell> = FxHashMap::default();
    let mut neighbors: SmallVec<[(Cell, FixedNum); 8]> = SmallVec::new();
    let mut expanded = 0usize;

    g_score.insert(start, FixedNum::ZERO);
    open.push_or_decrease(start, heuristic(start, goal, params.allow_diagonal));

    while let Some((current, _)) = open.pop_min() {
        if current == goal {
            let cost = g_score.get(&goal).copied().unwrap_or(FixedNum::ZERO);
            return Ok(SearchResult {
                cells: reconstruct(&came_from, goal),
                cost,
                expanded,
            });
        }

        expanded += 1;
        if params.max_expanded_nodes > 0 && expanded > params.max_expanded_nodes {
            debug!(
                "[PATHFINDING] Budget of {} expansions exhausted ({:?} -> {:?})",
                params.max_expanded_nodes, start, goal
            );
            return Err(SearchFailure::BudgetExhausted {
                budget: params.max_expanded_nodes,
                expanded,
            });
        }

        let current_g = g_score.get(&current).copied().unwrap_or(FixedNum::MAX);
        neighbors.clear();
        collect_neighbors(current, window, params.allow_diagonal, walkable, &mut neighbors);

        for &(next, step) in neighbors.iter() {
            let tentative = current_g + step;
            let known = g_score.get(&next).copied().unwrap_or(FixedNum::MAX);
            if tentative < known {
                came_from.insert(next, current);
                g_score.insert(next, tentative);
                open.push_or_decrease(next, tentative + heuristic(next, goal, params.allow_diagonal));
            }
        }
    }

    Err(SearchFailure::Unreachable { expanded })
}

/// A* with endpoint snapping: the goal is clamped into the window, then
/// both ends are moved to the nearest walkable cell when blocked.
pub fn find_route<F: FnMut(Cell) -> bool>(
    start: Cell,
    goal: Cell,
    window: &SearchWindow,
    params: &SearchParams,
    walkable: &mut F,
) -> Result<SearchResult, SearchFailure> {
    let goal = window.clamp(goal);
    let goal = nearest_walkable(goal, params.goal_snap_radius, window, walkable).unwrap_or(goal);
    let start = nearest_walkable(start, params.start_snap_radius, window, walkable).unwrap_or(start);

    if start == goal {
        return Ok(SearchResult {
            cells: vec![goal],
            cost: FixedNum::ZERO,
            expanded: 0,
        });
    }

    find_path(start, goal, window, params, walkable)
}

fn reconstruct(came_from: &FxHashMap<Cell, Cell>, goal: Cell) -> Vec<Cell> {
    let mut cells = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        cells.push(previous);
        current = previous;
    }
    cells.reverse();
    cells
}
