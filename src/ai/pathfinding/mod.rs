//! Grid pathfinding for individual agents.
//!
//! This module is organized into:
//! - **heap**: indexed binary min-heap with decrease-key (the A* open set)
//! - **astar**: windowed A* over the implicit lattice, endpoint snapping
//! - **walkable**: footprint overlap test with a per-generation memo
//! - **path**: waypoint polyline, collinear merging
//! - **steering**: local obstacle avoidance and orbiting
//! - **follower**: the [`PathFollower`] component (goals, re-plan triggers, waypoint following)

pub mod astar;
pub mod follower;
pub mod heap;
pub mod path;
pub mod steering;
pub mod walkable;

pub use astar::{find_path, find_route, heuristic, nearest_walkable, SearchFailure, SearchParams, SearchResult, SearchWindow};
pub use follower::{FollowerSettings, PathFollower, RepathReason, SearchRecord};
pub use heap::IndexedMinHeap;
pub use path::{merge_collinear, Path};
pub use steering::{orbit_direction, steer_with_avoidance, AvoidanceProbe, OrbitGains};
pub use walkable::{Footprint, WalkabilityCache};
