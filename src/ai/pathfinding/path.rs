use serde::Serialize;

use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::spatial::{Cell, GridSpec};

/// Waypoints closer to straight than this dot product are merged.
pub const COLLINEAR_DOT: f64 = 0.999;

/// World-space polyline plus the index of the waypoint being approached.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Path {
    waypoints: Vec<FixedVec2>,
    cursor: usize,
}

impl Path {
    /// Build from a cell path. Collinear runs are collapsed and the cursor
    /// starts past the start cell when there is somewhere else to go.
    pub fn from_cells(cells: &[Cell], grid: &GridSpec) -> Self {
        let points: Vec<FixedVec2> = cells.iter().map(|c| grid.cell_to_world(*c)).collect();
        Self::from_waypoints(merge_collinear(&points))
    }

    pub fn from_waypoints(waypoints: Vec<FixedVec2>) -> Self {
        let cursor = waypoints.len().saturating_sub(1).min(1);
        Self { waypoints, cursor }
    }

    pub fn waypoints(&self) -> &[FixedVec2] {
        &self.waypoints
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// No waypoint left to approach (also true for an empty path).
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.waypoints.len()
    }

    pub fn current(&self) -> Option<FixedVec2> {
        self.waypoints.get(self.cursor).copied()
    }

    pub fn peek(&self, ahead: usize) -> Option<FixedVec2> {
        self.waypoints.get(self.cursor + ahead).copied()
    }

    pub fn advance(&mut self) {
        if self.cursor < self.waypoints.len() {
            self.cursor += 1;
        }
    }

    pub fn skip(&mut self, count: usize) {
        self.cursor = (self.cursor + count).min(self.waypoints.len());
    }

    pub fn last(&self) -> Option<FixedVec2> {
        self.waypoints.last().copied()
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.cursor = 0;
    }
}

/// Drop interior points that continue in (almost) the same direction.
pub fn merge_collinear(points: &[FixedVec2]) -> Vec<FixedVec2> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let threshold = FixedNum::from_num(COLLINEAR_DOT);
    let mut merged = Vec::with_capacity(points.len());
    merged.push(points[0]);
    for window in points.windows(2).skip(1) {
        let (b, c) = (window[0], window[1]);
        let a = merged[merged.len() - 1];
        let incoming = (b - a).normalize();
        let outgoing = (c - b).normalize();
        if incoming.dot(outgoing) > threshold {
            continue;
        }
        merged.push(b);
    }
    merged.push(points[points.len() - 1]);
    merged
}
