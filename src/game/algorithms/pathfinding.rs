//! Grid A* used by hostile entities.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::game::grid::Grid;
use crate::game::types::Point;

#[derive(Debug)]
struct OpenNode {
    f: i32,
    g: i32,
    tie: u64,
    point: Point,
}

impl OpenNode {
    fn key(&self) -> (i32, u64) {
        (self.f, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap. Equal costs pop in arrival order.
        other.key().cmp(&self.key())
    }
}

/// Shortest 4-connected path from `start` to `goal` over walkable tiles.
///
/// Returns at most `max_steps` unit displacements. An unreachable goal, or a
/// goal equal to the start, yields an empty path.
pub fn find_path(grid: &Grid, start: Point, goal: Point, max_steps: usize) -> Vec<Point> {
    if start == goal || !grid.in_bounds(start) || !grid.is_walkable(goal) {
        return Vec::new();
    }

    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<Point, i32> = HashMap::from([(start, 0)]);
    let mut came_from: HashMap<Point, Point> = HashMap::new();
    let mut tie = 0u64;

    open.push(OpenNode { f: start.manhattan_distance(goal), g: 0, tie, point: start });

    while let Some(node) = open.pop() {
        if node.point == goal {
            return reconstruct(&came_from, start, goal, max_steps);
        }
        if g_score.get(&node.point).is_some_and(|g| node.g > *g) {
            // Stale entry.
            continue;
        }

        for next in node.point.neighbours(1) {
            if !grid.is_walkable(next) {
                continue;
            }
            let tentative = node.g + 1;
            if g_score.get(&next).is_some_and(|g| tentative >= *g) {
                continue;
            }
            g_score.insert(next, tentative);
            came_from.insert(next, node.point);
            tie += 1;
            open.push(OpenNode {
                f: tentative + next.manhattan_distance(goal),
                g: tentative,
                tie,
                point: next,
            });
        }
    }

    Vec::new()
}

fn reconstruct(came_from: &HashMap<Point, Point>, start: Point, goal: Point, max_steps: usize) -> Vec<Point> {
    let mut cells = vec![goal];
    let mut current = goal;
    while current != start {
        let Some(previous) = came_from.get(&current) else {
            return Vec::new();
        };
        current = *previous;
        cells.push(current);
    }
    cells.reverse();
    cells
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .take(max_steps)
        .collect()
}
