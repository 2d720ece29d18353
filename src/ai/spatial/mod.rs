//! Spatial predicates shared by perception, pathfinding and steering.
//!
//! - **grid**: lattice cells and world/cell mapping
//! - **shapes / obstacles**: the static obstacle layer and the [`Occupancy`] seam
//! - **line**: Bresenham sampling and discretized line-of-sight
//! - **visibility**: dot grids of cells with a clear line back to a focal point

pub mod grid;
pub mod line;
pub mod obstacles;
pub mod shapes;
pub mod visibility;

pub use grid::{Cell, GridSpec, MAX_CELL};
pub use line::{BresenhamLine, LineOfSightProbe};
pub use obstacles::{ObstacleId, ObstacleLayer, Occupancy};
pub use shapes::ObstacleShape;
pub use visibility::{VisibilityCache, VisibilityGrid, VisibilityStats};

#[cfg(test)]
mod tests;
