use super::*;
use crate::ai::fixed_math::{fx, FixedNum, FixedVec2};
use crate::ai::targeting::TargetId;

fn v(x: f64, y: f64) -> FixedVec2 {
    FixedVec2::new(fx(x), fx(y))
}

#[test]
fn bresenham_includes_both_endpoints() {
    let cells: Vec<Cell> = BresenhamLine::new(Cell::new(0, 0), Cell::new(4, 2)).collect();
    assert_eq!(cells.first(), Some(&Cell::new(0, 0)));
    assert_eq!(cells.last(), Some(&Cell::new(4, 2)));
    assert_eq!(cells.len(), 5);
    for pair in cells.windows(2) {
        assert!(pair[0].chebyshev(pair[1]) == 1, "line must be 8-connected: {:?}", pair);
    }
}

#[test]
fn bresenham_single_cell() {
    let cells: Vec<Cell> = BresenhamLine::new(Cell::new(3, -1), Cell::new(3, -1)).collect();
    assert_eq!(cells, vec![Cell::new(3, -1)]);
}

#[test]
fn bresenham_runs_backwards() {
    let forward: Vec<Cell> = BresenhamLine::new(Cell::new(0, 0), Cell::new(-3, -6)).collect();
    assert_eq!(forward.len(), 7);
    assert_eq!(forward.last(), Some(&Cell::new(-3, -6)));
}

#[test]
fn occluded_ignores_endpoints() {
    let probe = LineOfSightProbe::default();
    // Obstacle sitting on the start cell only.
    let layer = ObstacleLayer::with_shapes([ObstacleShape::circle(v(0.0, 0.0), fx(0.3))]);
    assert!(!probe.occluded(v(0.0, 0.0), v(5.0, 0.0), &layer));
}

#[test]
fn occluded_by_interior_obstacle() {
    let probe = LineOfSightProbe::default();
    let layer = ObstacleLayer::with_shapes([ObstacleShape::rect(v(2.5, 0.0), v(0.5, 2.0))]);
    assert!(probe.occluded(v(0.0, 0.0), v(5.0, 0.0), &layer));
    assert!(!probe.occluded(v(0.0, 5.0), v(5.0, 5.0), &layer));
}

#[test]
fn missing_collision_data_is_optimistic() {
    let probe = LineOfSightProbe::default();
    let none: Option<&ObstacleLayer> = None;
    assert!(!probe.occluded(v(0.0, 0.0), v(9.0, 9.0), &none));
    assert!(!none.overlaps_box(v(0.0, 0.0), v(10.0, 10.0)));
    assert!(!none.segment_blocked(v(-5.0, 0.0), v(5.0, 0.0)));
}

#[test]
fn segment_against_rect_and_circle() {
    let rect = ObstacleShape::rect(v(0.0, 0.0), v(1.0, 1.0));
    assert!(rect.intersects_segment(v(-3.0, 0.0), v(3.0, 0.0)));
    assert!(!rect.intersects_segment(v(-3.0, 2.0), v(3.0, 2.0)));
    assert!(!rect.intersects_segment(v(-3.0, 0.0), v(-2.0, 0.0)));
    // Vertical segment through the box.
    assert!(rect.intersects_segment(v(0.5, -4.0), v(0.5, 4.0)));

    let circle = ObstacleShape::circle(v(0.0, 0.0), fx(1.0));
    assert!(circle.intersects_segment(v(-3.0, 0.5), v(3.0, 0.5)));
    assert!(!circle.intersects_segment(v(-3.0, 1.5), v(3.0, 1.5)));
    assert!(!circle.intersects_segment(v(2.0, 0.0), v(3.0, 0.0)));
}

#[test]
fn box_overlap_excludes_touching() {
    let rect = ObstacleShape::rect(v(0.0, 0.0), v(1.0, 1.0));
    assert!(rect.overlaps_box(v(1.5, 0.0), v(0.6, 0.6)));
    assert!(!rect.overlaps_box(v(2.0, 0.0), v(1.0, 1.0)));
}

#[test]
fn layer_generation_tracks_edits() {
    let mut layer = ObstacleLayer::new();
    let g0 = layer.generation();
    let id = layer.insert(ObstacleShape::circle(v(1.0, 1.0), fx(0.5)));
    assert!(layer.generation() > g0);
    let g1 = layer.generation();
    assert!(layer.remove(id));
    assert!(layer.generation() > g1);
    assert!(!layer.remove(id));
}

#[test]
fn visibility_grid_open_field() {
    let none: Option<&ObstacleLayer> = None;
    let grid = VisibilityGrid::build(v(0.0, 0.0), fx(3.0), fx(1.0), &none);
    // Lattice points within radius 3 of the origin.
    let expected = (-3..=3)
        .flat_map(|y| (-3..=3).map(move |x| (x, y)))
        .filter(|(x, y)| x * x + y * y <= 9)
        .count();
    assert_eq!(grid.stats().visible, expected);
    assert_eq!(grid.visible_cells().count(), expected);
    assert!(grid.is_visible(Cell::new(0, 3)));
    assert!(!grid.is_visible(Cell::new(3, 3)));
    assert!(!grid.is_visible(Cell::new(40, 0)));
}

#[test]
fn visibility_grid_shadowed_by_wall() {
    let layer = ObstacleLayer::with_shapes([ObstacleShape::rect(v(1.5, 0.0), v(0.2, 0.6))]);
    let grid = VisibilityGrid::build(v(0.0, 0.0), fx(3.0), fx(1.0), &layer);
    assert!(!grid.is_visible(Cell::new(3, 0)), "dot behind the wall is hidden");
    assert!(grid.is_visible(Cell::new(-3, 0)));
    assert!(grid.stats().blocked > 0);
    assert_eq!(grid.stats().visible + grid.stats().blocked + grid.stats().skipped_by_distance, 49);
}

#[test]
fn visibility_cache_rebuilds_per_tick_and_geometry() {
    let mut layer = ObstacleLayer::new();
    let mut cache = VisibilityCache::default();
    let target = TargetId(7);
    let visible = cache.get_or_build(target, v(0.0, 0.0), fx(2.0), fx(1.0), 1, &layer).stats().visible;

    layer.insert(ObstacleShape::rect(v(1.5, 0.0), v(0.2, 2.5)));
    let same_tick = cache.get_or_build(target, v(0.0, 0.0), fx(2.0), fx(1.0), 1, &layer).stats().visible;
    assert!(same_tick < visible, "geometry change forces a rebuild");

    cache.forget(target);
    assert!(cache.get(target).is_none());
}

#[test]
fn world_to_cell_rounds_to_nearest() {
    let grid = GridSpec::new(fx(0.5));
    assert_eq!(grid.world_to_cell(v(0.74, -0.76)), Cell::new(1, -2));
    assert_eq!(grid.cell_to_world(Cell::new(1, -2)), v(0.5, -1.0));
}

#[test]
fn far_coordinates_saturate_instead_of_panicking() {
    let grid = GridSpec::new(fx(0.01));
    let far = FixedVec2::new(FixedNum::MAX, FixedNum::MIN);
    let cell = grid.world_to_cell(far);
    assert_eq!(cell, Cell::new(MAX_CELL, -MAX_CELL));
    // Neighbours of a saturated cell stay representable.
    assert_eq!(cell.offset(1, -1), Cell::new(MAX_CELL + 1, -MAX_CELL - 1));
    let back = grid.cell_to_world(cell);
    assert!(back.x > FixedNum::ZERO && back.y < FixedNum::ZERO);
}
