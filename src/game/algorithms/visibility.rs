//! Ray-cast sight.
//!
//! A facing entity sees along a fixed fan of rays: a forward cone plus a short
//! ring around itself. Each ray is walked cell by cell and goes through at most
//! one obstruction: it stops right after recording its second opaque cell.

use std::collections::HashSet;

use crate::config::entities::{SIGHT_AURA, SIGHT_RANGE, SIGHT_SPREAD};
use crate::game::grid::Grid;
use crate::game::types::{Direction, Point};

/// Opaque cells a ray records before it stops.
pub const MAX_OPAQUE_PER_RAY: usize = 2;

/// Ray endpoints relative to an entity facing `direction`.
pub fn sight_endpoints(direction: Direction) -> Vec<Point> {
    let mut endpoints: Vec<Point> = (-SIGHT_SPREAD..=SIGHT_SPREAD)
        .map(|side| Point::new(side, SIGHT_RANGE))
        .collect();

    for i in -SIGHT_AURA..=SIGHT_AURA {
        endpoints.push(Point::new(i, -SIGHT_AURA));
        endpoints.push(Point::new(i, SIGHT_AURA));
        endpoints.push(Point::new(-SIGHT_AURA, i));
        endpoints.push(Point::new(SIGHT_AURA, i));
    }
    endpoints.sort();
    endpoints.dedup();

    endpoints.into_iter().map(|p| direction.orient(p)).collect()
}

/// Bresenham line from `from` to `to`, both ends included.
pub fn line(from: Point, to: Point) -> Vec<Point> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut error = dx + dy;
    let mut at = from;
    let mut cells = vec![at];

    while at != to {
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            at.x += sx;
        }
        if doubled <= dx {
            error += dx;
            at.y += sy;
        }
        cells.push(at);
    }
    cells
}

/// Walk one ray, adding what it reaches to `visible`. Leaving the board ends
/// the ray. Returns the cells recorded by this ray.
pub fn cast_ray(grid: &Grid, from: Point, to: Point, visible: &mut HashSet<Point>) -> Vec<Point> {
    let mut recorded = Vec::new();
    let mut opaque = 0;
    for cell in line(from, to) {
        if !grid.in_bounds(cell) {
            break;
        }
        visible.insert(cell);
        recorded.push(cell);
        if grid.is_opaque(cell) {
            opaque += 1;
            if opaque >= MAX_OPAQUE_PER_RAY {
                break;
            }
        }
    }
    recorded
}

/// Every cell seen from `position` while facing `direction`.
pub fn compute_sight(grid: &Grid, position: Point, direction: Direction) -> HashSet<Point> {
    let mut visible = HashSet::new();
    for endpoint in sight_endpoints(direction) {
        cast_ray(grid, position, position + endpoint, &mut visible);
    }
    visible
}
