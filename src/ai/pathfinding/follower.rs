use bevy::prelude::*;
use rand::Rng;

use super::astar::{find_route, SearchFailure, SearchParams, SearchWindow};
use super::path::Path;
use super::steering::{steer_with_avoidance, AvoidanceProbe};
use super::walkable::{Footprint, WalkabilityCache};
use crate::ai::fixed_math::{FixedNum, FixedVec2};
use crate::ai::spatial::{Cell, GridSpec, Occupancy};

/// Tuning for a [`PathFollower`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FollowerSettings {
    pub grid: GridSpec,
    pub move_speed: FixedNum,
    pub waypoint_threshold: FixedNum,
    /// Goal-cell displacement that forces a fresh search.
    pub repath_goal_moved: FixedNum,
    pub hard_repath_interval: FixedNum,
    pub min_progress_per_second: FixedNum,
    pub progress_window: FixedNum,
    pub window_half_extents: (i32, i32),
    pub search: SearchParams,
    pub footprint: Footprint,
    pub avoidance: AvoidanceProbe,
}

impl Default for FollowerSettings {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            move_speed: FixedNum::from_num(2.5),
            waypoint_threshold: FixedNum::from_num(0.2),
            repath_goal_moved: FixedNum::from_num(0.5),
            hard_repath_interval: FixedNum::from_num(0.75),
            min_progress_per_second: FixedNum::from_num(0.02),
            progress_window: FixedNum::from_num(0.5),
            window_half_extents: (40, 40),
            search: SearchParams::default(),
            footprint: Footprint::default(),
            avoidance: AvoidanceProbe::default(),
        }
    }
}

/// Why the last search ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepathReason {
    NewGoal,
    GoalMoved,
    Interval,
    Stalled,
    PathExhausted,
}

/// Outcome of the most recent search, for telemetry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchRecord {
    pub reason: RepathReason,
    pub failure: Option<SearchFailure>,
    pub used_fallback: bool,
}

/// Goal-driven grid navigation: owns the current path and decides when to
/// search again.
///
/// Drive it with [`set_goal`](Self::set_goal) / [`clear_goal`](Self::clear_goal)
/// and call [`tick`](Self::tick) once per simulation step to get the
/// desired velocity.
#[derive(Component, Debug, Clone, Default)]
pub struct PathFollower {
    pub settings: FollowerSettings,
    goal: Option<FixedVec2>,
    fallback: Option<FixedVec2>,
    path: Path,
    pending: Option<RepathReason>,
    searched_goal_cell: Option<Cell>,
    since_search: FixedNum,
    progress_anchor: Option<FixedVec2>,
    progress_elapsed: FixedNum,
    last_search_failed: bool,
    following_fallback: bool,
    walkability: WalkabilityCache,
    last_search: Option<SearchRecord>,
}

impl PathFollower {
    pub fn new(settings: FollowerSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Point the follower at `goal`. Repeated calls while a goal is active
    /// only move it; the re-plan triggers decide when to search again.
    pub fn set_goal(&mut self, goal: FixedVec2) {
        if self.goal.is_none() {
            self.pending = Some(RepathReason::NewGoal);
            self.progress_anchor = None;
            self.progress_elapsed = FixedNum::ZERO;
        }
        self.goal = Some(goal);
    }

    pub fn clear_goal(&mut self) {
        self.goal = None;
        self.path.clear();
        self.pending = None;
        self.searched_goal_cell = None;
        self.last_search_failed = false;
        self.following_fallback = false;
    }

    /// Where to go when the real goal cannot be reached.
    pub fn set_fallback_goal(&mut self, fallback: Option<FixedVec2>) {
        self.fallback = fallback;
    }

    pub fn goal(&self) -> Option<FixedVec2> {
        self.goal
    }

    pub fn has_goal(&self) -> bool {
        self.goal.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_search(&self) -> Option<SearchRecord> {
        self.last_search
    }

    pub fn is_following_fallback(&self) -> bool {
        self.following_fallback
    }

    /// Adopt `path` toward `goal` as if a search had just produced it.
    #[cfg(test)]
    pub(crate) fn follow_path(&mut self, goal: FixedVec2, path: Path) {
        self.goal = Some(goal);
        self.searched_goal_cell = Some(self.settings.grid.world_to_cell(goal));
        self.pending = None;
        self.since_search = FixedNum::ZERO;
        self.last_search_failed = false;
        self.path = path;
    }

    /// Advance one step and return the desired velocity.
    pub fn tick<O, R>(&mut self, position: FixedVec2, dt: FixedNum, obstacles: &O, rng: &mut R) -> FixedVec2
    where
        O: Occupancy + ?Sized,
        R: Rng,
    {
        let Some(goal) = self.goal else {
            return FixedVec2::ZERO;
        };

        self.since_search += dt;
        let stalled = self.track_progress(position, dt);

        if let Some(reason) = self.pending.take().or_else(|| self.repath_reason(goal, position, stalled)) {
            self.replan(reason, position, goal, obstacles);
        }

        let threshold = self.settings.waypoint_threshold;
        while let Some(waypoint) = self.path.current() {
            if position.distance(waypoint) > threshold {
                break;
            }
            self.path.advance();
        }
        if self.path.is_finished() {
            return FixedVec2::ZERO;
        }

        self.skip_ahead(position, obstacles);

        let Some(waypoint) = self.path.current() else {
            return FixedVec2::ZERO;
        };
        let heading = steer_with_avoidance(position, waypoint - position, &self.settings.avoidance, obstacles, rng);
        heading * self.settings.move_speed
    }

    /// Returns true when the sliding window closed with too little progress.
    fn track_progress(&mut self, position: FixedVec2, dt: FixedNum) -> bool {
        let Some(anchor) = self.progress_anchor else {
            self.progress_anchor = Some(position);
            self.progress_elapsed = FixedNum::ZERO;
            return false;
        };
        self.progress_elapsed += dt;
        if self.progress_elapsed < self.settings.progress_window || self.progress_elapsed <= FixedNum::ZERO {
            return false;
        }
        let rate = anchor.distance(position) / self.progress_elapsed;
        self.progress_anchor = Some(position);
        self.progress_elapsed = FixedNum::ZERO;
        rate < self.settings.min_progress_per_second && !self.path.is_finished()
    }

    fn repath_reason(&self, goal: FixedVec2, position: FixedVec2, stalled: bool) -> Option<RepathReason> {
        let grid = &self.settings.grid;
        let goal_cell = grid.world_to_cell(goal);
        if let Some(previous) = self.searched_goal_cell {
            if goal_cell != previous
                && grid.cell_to_world(goal_cell).distance(grid.cell_to_world(previous)) >= self.settings.repath_goal_moved
            {
                return Some(RepathReason::GoalMoved);
            }
        }
        if self.since_search >= self.settings.hard_repath_interval {
            return Some(RepathReason::Interval);
        }
        if stalled {
            return Some(RepathReason::Stalled);
        }
        let arrived = position.distance(goal) <= self.settings.waypoint_threshold;
        if self.path.is_finished() && !self.last_search_failed && !arrived {
            return Some(RepathReason::PathExhausted);
        }
        None
    }

    fn replan<O: Occupancy + ?Sized>(&mut self, reason: RepathReason, position: FixedVec2, goal: FixedVec2, obstacles: &O) {
        let grid = self.settings.grid;
        let goal_cell = grid.world_to_cell(goal);

        self.since_search = FixedNum::ZERO;
        self.searched_goal_cell = Some(goal_cell);
        self.walkability.sync(obstacles);

        let mut used_fallback = false;
        let failure = match self.search(position, goal_cell, obstacles) {
            Ok(path) => {
                self.path = path;
                self.following_fallback = false;
                None
            }
            Err(failure) => {
                debug!("[PATHFINDING] Search to {:?} failed ({:?}): {}", goal_cell, reason, failure);
                self.path.clear();
                self.following_fallback = false;
                if let Some(home) = self.fallback {
                    if let Ok(path) = self.search(position, grid.world_to_cell(home), obstacles) {
                        self.path = path;
                        self.following_fallback = true;
                        used_fallback = true;
                    }
                }
                Some(failure)
            }
        };

        self.last_search_failed = failure.is_some() || self.path.is_empty();
        self.last_search = Some(SearchRecord {
            reason,
            failure,
            used_fallback,
        });
    }

    fn search<O: Occupancy + ?Sized>(&mut self, position: FixedVec2, goal: Cell, obstacles: &O) -> Result<Path, SearchFailure> {
        let settings = self.settings;
        let start = settings.grid.world_to_cell(position);
        let (half_x, half_y) = settings.window_half_extents;
        let window = SearchWindow::around(start, half_x, half_y);
        let cache = &mut self.walkability;
        let mut walkable = |cell: Cell| cache.is_walkable(cell, &settings.grid, &settings.footprint, obstacles);
        let found = find_route(start, goal, &window, &settings.search, &mut walkable)?;
        Ok(Path::from_cells(&found.cells, &settings.grid))
    }

    /// Jump the cursor up to two waypoints ahead when the segment there is clear.
    fn skip_ahead<O: Occupancy + ?Sized>(&mut self, position: FixedVec2, obstacles: &O) {
        for ahead in [2usize, 1] {
            if let Some(point) = self.path.peek(ahead) {
                if !obstacles.segment_blocked(position, point) {
                    self.path.skip(ahead);
                    return;
                }
            }
        }
    }
}
