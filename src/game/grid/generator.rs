//! Procedural level generation.
//!
//! A level is built on a coarse logical lattice (one third of the board side) and
//! upscaled into 3x3 tile blocks:
//! 1. rooms are placed by rejection sampling,
//! 2. a maze is grown through every remaining odd cell,
//! 3. regions are stitched together until everything is connected, some of the
//!    stitches becoming doors,
//! 4. single-width dead ends are pruned,
//! 5. the lattice is upscaled, walls get sprites from their neighbours and doors
//!    get their frame,
//! 6. clutter is scattered on the floor.
//!
//! Key placement runs afterwards from the chosen spawn point, see [`place_keys`].

use std::collections::HashSet;

use log::debug;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::config::generator::{
    CLUTTER_CHANCE, CONNECTIONS_PER_PASS, DOOR_PERCENTAGE, PLACEMENT_ATTEMPTS, ROOM_ATTEMPTS,
    ROOM_MAX_SIZE, ROOM_MIN_SIZE, SCALE,
};
use crate::game::error::{GameError, GameResult};
use crate::game::grid::grid::Grid;
use crate::game::grid::tile::{Item, Tile, TileKind};
use crate::game::types::{Orientation, Point};

const UNIT_STEPS: [Point; 4] = [
    Point::new(1, 0),
    Point::new(-1, 0),
    Point::new(0, 1),
    Point::new(0, -1),
];

/// A doorway left by the generator. The game puts a door entity on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorSite {
    pub position: Point,
    pub orientation: Orientation,
}

/// Finished board plus the anchors the game needs to populate it.
#[derive(Debug, Clone)]
pub struct Level {
    pub grid: Grid,
    /// Tile at the middle of each room's central block.
    pub room_centers: Vec<Point>,
    pub doors: Vec<DoorSite>,
}

/// Where the key of `doors[door]` was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPlacement {
    pub door: usize,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Unknown,
    Floor,
    Door(Orientation),
}

impl Cell {
    fn open(self) -> bool {
        self != Cell::Unknown
    }
}

/// Logical lattice the level is designed on.
struct Blueprint {
    n: i32,
    cells: Vec<Cell>,
    room_centers: Vec<Point>,
}

impl Blueprint {
    fn new(n: usize) -> Self {
        Self {
            n: n as i32,
            cells: vec![Cell::Unknown; n * n],
            room_centers: Vec::new(),
        }
    }

    fn get(&self, p: Point) -> Cell {
        if p.x < 0 || p.y < 0 || p.x >= self.n || p.y >= self.n {
            return Cell::Unknown;
        }
        self.cells[(p.y * self.n + p.x) as usize]
    }

    fn set(&mut self, p: Point, cell: Cell) {
        let i = (p.y * self.n + p.x) as usize;
        self.cells[i] = cell;
    }

    /// Odd coordinates strictly inside the border: the maze nodes.
    fn is_node(&self, p: Point) -> bool {
        p.x > 0 && p.y > 0 && p.x < self.n - 1 && p.y < self.n - 1 && p.x % 2 == 1 && p.y % 2 == 1
    }

    fn nodes(&self) -> Vec<Point> {
        let mut nodes = Vec::new();
        for x in (1..self.n - 1).step_by(2) {
            for y in (1..self.n - 1).step_by(2) {
                nodes.push(Point::new(x, y));
            }
        }
        nodes
    }

    fn place_rooms<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let n = self.n as usize;
        for _ in 0..ROOM_ATTEMPTS {
            let width = rng.random_range(ROOM_MIN_SIZE / 2..=ROOM_MAX_SIZE / 2) * 2 + 1;
            let height = rng.random_range(ROOM_MIN_SIZE / 2..=ROOM_MAX_SIZE / 2) * 2 + 1;
            if width + 2 > n || height + 2 > n {
                continue;
            }
            let x = (rng.random_range(0..=(n - width - 2) / 2) * 2 + 1) as i32;
            let y = (rng.random_range(0..=(n - height - 2) / 2) * 2 + 1) as i32;
            let (w, h) = (width as i32, height as i32);

            // The room and a one cell ring around it must still be untouched.
            let fits = (x - 1..x + w + 1)
                .all(|i| (y - 1..y + h + 1).all(|j| self.get(Point::new(i, j)) == Cell::Unknown));
            if !fits {
                continue;
            }
            for i in x..x + w {
                for j in y..y + h {
                    self.set(Point::new(i, j), Cell::Floor);
                }
            }
            self.room_centers.push(Point::new(x + w / 2, y + h / 2));
        }
    }

    fn carve_maze<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut uncarved: Vec<Point> = self
            .nodes()
            .into_iter()
            .filter(|p| self.get(*p) == Cell::Unknown)
            .collect();

        while let Some(seed) = uncarved.pop() {
            if self.get(seed) != Cell::Unknown {
                continue;
            }
            self.set(seed, Cell::Floor);

            let mut growing = vec![seed];
            while !growing.is_empty() {
                let index = rng.random_range(0..growing.len());
                let current = growing[index];
                let options: Vec<Point> = current
                    .neighbours(2)
                    .into_iter()
                    .filter(|p| self.is_node(*p) && self.get(*p) == Cell::Unknown)
                    .collect();

                match options.choose(rng) {
                    Some(&next) => {
                        self.set(next, Cell::Floor);
                        self.set(midpoint(current, next), Cell::Floor);
                        growing.push(next);
                    }
                    None => {
                        growing.swap_remove(index);
                    }
                }
            }
        }
    }

    /// Grow the region reachable from (1, 1) and keep opening connectors on its
    /// border until it spans every maze node.
    fn connect_regions<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let total = self.nodes().len();
        let mut region: HashSet<Point> = HashSet::new();
        let mut tails = vec![Point::new(1, 1)];

        loop {
            while let Some(tail) = tails.pop() {
                if !region.insert(tail) {
                    continue;
                }
                for step in UNIT_STEPS {
                    let next = tail + step * 2;
                    if self.get(tail + step).open() && self.is_node(next) && !region.contains(&next) {
                        tails.push(next);
                    }
                }
            }

            if region.len() >= total {
                return;
            }

            let mut edges: Vec<Point> = region
                .iter()
                .flat_map(|p| p.neighbours(2))
                .filter(|p| self.is_node(*p) && !region.contains(p))
                .collect();
            // Sorted so that a seeded rng gives a reproducible level.
            edges.sort();
            edges.dedup();
            if edges.is_empty() {
                return;
            }

            for i in 0..CONNECTIONS_PER_PASS.min(edges.len()) {
                let edge = edges.swap_remove(rng.random_range(0..edges.len()));
                if i == 0 {
                    tails.push(edge);
                }
                let Some(step) = UNIT_STEPS.into_iter().find(|s| region.contains(&(edge + *s * 2))) else {
                    continue;
                };
                let cell = if rng.random_bool(DOOR_PERCENTAGE) {
                    let orientation = if step.x != 0 { Orientation::Vertical } else { Orientation::Horizontal };
                    Cell::Door(orientation)
                } else {
                    Cell::Floor
                };
                self.set(edge + step, cell);
            }
        }
    }

    fn is_dead_end(&self, p: Point) -> bool {
        self.get(p).open() && UNIT_STEPS.iter().filter(|s| !self.get(p + **s).open()).count() == 3
    }

    fn remove_dead_ends(&mut self) {
        let ends: Vec<Point> = self.nodes().into_iter().filter(|p| self.is_dead_end(*p)).collect();
        for mut end in ends {
            while self.is_dead_end(end) {
                let Some(step) = UNIT_STEPS.into_iter().find(|s| self.get(end + *s).open()) else {
                    break;
                };
                self.set(end, Cell::Unknown);
                self.set(end + step, Cell::Unknown);
                end = end + step * 2;
            }
        }
    }

    /// Turn every logical cell into a 3x3 block of tiles.
    fn upscale<R: Rng + ?Sized>(&self, rng: &mut R) -> Level {
        let scale = SCALE as i32;
        let size = self.n as usize * SCALE;
        let mut grid = Grid::new(size, Tile::unknown());
        let mut doors = Vec::new();

        for lx in 0..self.n {
            for ly in 0..self.n {
                let center = Point::new(lx * scale + 1, ly * scale + 1);
                match self.get(Point::new(lx, ly)) {
                    Cell::Unknown => {}
                    Cell::Floor => {
                        for offset in block_offsets() {
                            grid.set(center + offset, Tile::floor());
                        }
                    }
                    Cell::Door(orientation) => {
                        frame_door(&mut grid, center, orientation);
                        doors.push(DoorSite { position: center, orientation });
                    }
                }
            }
        }

        infer_walls(&mut grid, rng);
        for door in &doors {
            decorate_door(&mut grid, door);
        }

        Level {
            grid,
            room_centers: self
                .room_centers
                .iter()
                .map(|c| Point::new(c.x * scale + 1, c.y * scale + 1))
                .collect(),
            doors,
        }
    }
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2, (a.y + b.y) / 2)
}

fn block_offsets() -> impl Iterator<Item = Point> {
    (-1..=1).flat_map(|dx| (-1..=1).map(move |dy| Point::new(dx, dy)))
}

fn frame_door(grid: &mut Grid, center: Point, orientation: Orientation) {
    for d in -1..=1 {
        let (side_a, side_b) = match orientation {
            Orientation::Vertical => (Point::new(-1, d), Point::new(1, d)),
            Orientation::Horizontal => (Point::new(d, -1), Point::new(d, 1)),
        };
        grid.set(center + side_a, Tile::floor());
        grid.set(center + side_b, Tile::floor());
    }
    let (jamb, image) = match orientation {
        Orientation::Vertical => (Point::new(0, 1), "thin_wall_v"),
        Orientation::Horizontal => (Point::new(1, 0), "thin_wall_h"),
    };
    grid.set(center + jamb, Tile::new(TileKind::ThinWall, image));
    grid.set(center - jamb, Tile::new(TileKind::ThinWall, image));
    let doorway = match orientation {
        Orientation::Vertical => "doorway_v",
        Orientation::Horizontal => "doorway_h",
    };
    grid.set(center, Tile::new(TileKind::Doorway(orientation), doorway));
}

/// Connector sprites on the walls the door frame runs into.
fn decorate_door(grid: &mut Grid, door: &DoorSite) {
    let connectors = match door.orientation {
        Orientation::Vertical => [(Point::new(0, -2), "thin_wall_v_top"), (Point::new(0, 2), "thin_wall_v_bottom")],
        Orientation::Horizontal => [(Point::new(-2, 0), "thin_wall_h_left"), (Point::new(2, 0), "thin_wall_h_right")],
    };
    for (offset, image) in connectors {
        if let Some(tile) = grid.get_mut(door.position + offset) {
            if tile.kind == TileKind::Wall {
                tile.image = image.to_string();
            }
        }
    }
}

/// Pick a wall sprite for a tile from the walkability of its neighbours. Some
/// sprites also dress the wall tile right above them.
fn wall_sprite<R: Rng + ?Sized>(open: impl Fn(i32, i32) -> bool, rng: &mut R) -> (String, Option<String>) {
    let (down, up, left, right) = (open(0, 1), open(0, -1), open(-1, 0), open(1, 0));
    let pair = |a: &str, b: &str| (a.to_string(), Some(b.to_string()));

    if down {
        if left {
            pair("corner_bl", "corner_bl_top")
        } else if right {
            pair("corner_br", "corner_br_top")
        } else {
            match rng.random_range(0..21) {
                1 => pair("edge_b_alt1", "edge_b_alt1_top"),
                2 => pair("edge_b_alt2", "edge_b_alt2_top"),
                3 => pair("edge_b_alt3", "edge_b_top"),
                _ => pair("edge_b", "edge_b_top"),
            }
        }
    } else if up {
        let sprite = if left {
            "corner_tl"
        } else if right {
            "corner_tr"
        } else if rng.random_range(0..11) == 1 {
            "edge_t_alt1"
        } else {
            "edge_t"
        };
        (sprite.to_string(), None)
    } else if left {
        ("edge_l".to_string(), None)
    } else if right {
        ("edge_r".to_string(), None)
    } else if open(-1, 1) {
        pair("inner_tr", "inner_tr_top")
    } else if open(-1, -1) {
        pair("inner_br", "inner_br_top")
    } else if open(1, 1) {
        pair("inner_tl", "inner_tl_top")
    } else if open(1, -1) {
        pair("inner_bl", "inner_bl_top")
    } else {
        ("void".to_string(), None)
    }
}

fn infer_walls<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    let unknown: Vec<Point> = grid
        .points()
        .filter(|p| grid.get(*p).is_some_and(|t| t.kind == TileKind::Unknown))
        .collect();

    let mut overlays = Vec::new();
    let mut sprites = Vec::with_capacity(unknown.len());
    for p in unknown {
        let (sprite, above) = wall_sprite(|dx, dy| grid.is_walkable(p + Point::new(dx, dy)), rng);
        if let Some(above) = above {
            overlays.push((p + Point::new(0, -1), above));
        }
        sprites.push((p, sprite));
    }

    for (p, sprite) in sprites {
        grid.set(p, Tile::wall(sprite));
    }
    for (p, sprite) in overlays {
        if let Some(tile) = grid.get_mut(p) {
            if tile.kind == TileKind::Wall {
                tile.image = sprite;
            }
        }
    }
}

fn scatter_clutter<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    for p in grid.walkable_points() {
        if let Some(tile) = grid.get_mut(p) {
            if tile.kind == TileKind::Floor && rng.random_range(0..CLUTTER_CHANCE) == 0 {
                tile.item = Some(Item::Rubbish);
            }
        }
    }
}

/// Build a finished level for a board of `size` x `size` tiles.
///
/// `size` must be a multiple of 3 whose third is odd; anything else is a
/// configuration error. Running out of room attempts only yields fewer rooms.
pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> GameResult<Level> {
    if size == 0 || size % SCALE != 0 {
        return Err(GameError::Configuration(format!(
            "board size {size} must be a positive multiple of {SCALE}"
        )));
    }
    let n = size / SCALE;
    if n % 2 == 0 || n < 3 {
        return Err(GameError::Configuration(format!(
            "board size {size} must downscale to an odd lattice of at least 3 cells, got {n}"
        )));
    }

    let mut blueprint = Blueprint::new(n);
    blueprint.place_rooms(rng);
    blueprint.carve_maze(rng);
    blueprint.connect_regions(rng);
    blueprint.remove_dead_ends();

    let mut level = blueprint.upscale(rng);
    scatter_clutter(&mut level.grid, rng);

    debug!(
        "[Generator] size={} rooms={} doors={}",
        size,
        level.room_centers.len(),
        level.doors.len()
    );
    Ok(level)
}

/// Middle tile of the block containing `p`.
pub fn block_center(p: Point) -> Point {
    let scale = SCALE as i32;
    Point::new(p.x.div_euclid(scale) * scale + 1, p.y.div_euclid(scale) * scale + 1)
}

/// Flood-fill the block lattice from `spawn`. Doorways stop the fill unless they
/// are listed in `open_doors`; a blocking doorway is still reported as reached.
pub fn flood_fill(grid: &Grid, spawn: Point, open_doors: &HashSet<Point>) -> Vec<Point> {
    let scale = SCALE as i32;
    let mut visited = HashSet::new();
    let mut reached = Vec::new();
    let mut frontier = vec![block_center(spawn)];

    while let Some(current) = frontier.pop() {
        if !visited.insert(current) {
            continue;
        }
        reached.push(current);

        for next in current.neighbours(scale) {
            if visited.contains(&next) {
                continue;
            }
            match grid.get(next).map(|t| t.kind) {
                Some(TileKind::Doorway(_)) if !open_doors.contains(&next) => {
                    visited.insert(next);
                    reached.push(next);
                }
                Some(_) if grid.is_walkable(next) => frontier.push(next),
                _ => {}
            }
        }
    }
    reached
}

/// Drop every door's key somewhere reachable before that door has to be opened.
///
/// Repeats the flood-fill from `spawn` with locked doors blocking. Each door the
/// fill reaches gets its key in the area reached so far and is then considered
/// unlocked, until a pass reaches no new door. Returns the placements in the
/// order they were made, and the final reachable block centers.
pub fn place_keys<R: Rng + ?Sized>(level: &Level, spawn: Point, rng: &mut R) -> (Vec<KeyPlacement>, Vec<Point>) {
    let mut unlocked: HashSet<Point> = HashSet::new();
    // Keys never land under the starting party.
    let mut taken: HashSet<Point> = (-1..=1)
        .flat_map(|dx| (-1..=1).map(move |dy| spawn + Point::new(dx, dy)))
        .collect();
    let mut placements = Vec::new();

    loop {
        let reachable = flood_fill(&level.grid, spawn, &unlocked);
        let floor: Vec<Point> = reachable
            .iter()
            .copied()
            .filter(|p| level.grid.get(*p).is_some_and(|t| t.kind == TileKind::Floor))
            .collect();

        let mut progressed = false;
        for (index, door) in level.doors.iter().enumerate() {
            if unlocked.contains(&door.position) || !reachable.contains(&door.position) {
                continue;
            }
            let position = sample_cell(&level.grid, &floor, |p| taken.contains(&p), rng)
                .or_else(|| first_free_cell(&level.grid, &floor, &taken));
            let Some(position) = position else {
                debug!("[Generator] no free cell left for the key of door {:?}", door.position);
                continue;
            };
            taken.insert(position);
            placements.push(KeyPlacement { door: index, position });
            unlocked.insert(door.position);
            progressed = true;
        }

        if !progressed {
            return (placements, reachable);
        }
    }
}

/// First floor cell of the blocks around `anchors` that is not taken.
fn first_free_cell(grid: &Grid, anchors: &[Point], taken: &HashSet<Point>) -> Option<Point> {
    anchors
        .iter()
        .flat_map(|a| (-1..=1).flat_map(move |dx| (-1..=1).map(move |dy| *a + Point::new(dx, dy))))
        .find(|p| !taken.contains(p) && grid.get(*p).is_some_and(|t| t.kind == TileKind::Floor))
}

/// Sample a walkable cell within one tile of a random anchor, rejecting cells for
/// which `occupied` holds. Gives up after a bounded number of attempts.
pub fn sample_cell<R: Rng + ?Sized>(
    grid: &Grid,
    anchors: &[Point],
    occupied: impl Fn(Point) -> bool,
    rng: &mut R,
) -> Option<Point> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let anchor = *anchors.choose(rng)?;
        let candidate = anchor + Point::new(rng.random_range(-1..=1), rng.random_range(-1..=1));
        let floor = grid.get(candidate).is_some_and(|t| t.kind == TileKind::Floor);
        if floor && !occupied(candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Mark a 2x3 totem at a spawner site.
pub fn raise_totem(grid: &mut Grid, at: Point) {
    let parts = [
        (Point::new(0, -1), "totem_top_left"),
        (Point::new(0, 0), "totem_mid_left"),
        (Point::new(0, 1), "totem_bot_left"),
        (Point::new(1, -1), "totem_top_right"),
        (Point::new(1, 0), "totem_mid_right"),
        (Point::new(1, 1), "totem_bot_right"),
    ];
    for (offset, image) in parts {
        grid.set(at + offset, Tile::new(TileKind::Totem, image));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn level(seed: u64, size: usize) -> Level {
        let mut rng = StdRng::seed_from_u64(seed);
        generate(size, &mut rng).expect("valid size")
    }

    fn spawn_of(level: &Level) -> Point {
        level
            .room_centers
            .first()
            .copied()
            .or_else(|| level.grid.walkable_points().first().copied())
            .expect("level has floor")
    }

    /// Tile-level BFS treating every walkable tile, doorways included, as open.
    fn reachable_tiles(grid: &Grid, from: Point) -> HashSet<Point> {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(p) = queue.pop_front() {
            for n in p.neighbours(1) {
                if grid.is_walkable(n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        seen
    }

    #[test]
    fn rejects_sizes_not_divisible_by_three() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(generate(94, &mut rng), Err(GameError::Configuration(_))));
    }

    #[test]
    fn rejects_even_lattice() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(generate(90, &mut rng), Err(GameError::Configuration(_))));
        assert!(matches!(generate(6, &mut rng), Err(GameError::Configuration(_))));
    }

    #[test]
    fn board_has_requested_size() {
        let level = level(3, 45);
        assert_eq!(level.grid.size(), 45);
        assert!(level.grid.points().all(|p| level.grid.get(p).is_some_and(|t| t.kind != TileKind::Unknown)));
    }

    #[test]
    fn border_ring_is_never_walkable() {
        for seed in 0..6 {
            let level = level(seed, 45);
            let last = level.grid.size() as i32 - 1;
            for i in 0..=last {
                for p in [Point::new(i, 0), Point::new(i, last), Point::new(0, i), Point::new(last, i)] {
                    assert!(!level.grid.is_walkable(p), "seed {seed}: border tile {p:?} is walkable");
                }
            }
        }
    }

    #[test]
    fn every_floor_tile_is_reachable_from_spawn() {
        for seed in 0..6 {
            let level = level(seed, 63);
            let spawn = spawn_of(&level);
            let reached = reachable_tiles(&level.grid, spawn);
            for p in level.grid.walkable_points() {
                assert!(reached.contains(&p), "seed {seed}: {p:?} is an isolated pocket");
            }
        }
    }

    #[test]
    fn room_centers_are_floor() {
        let level = level(11, 93);
        assert!(!level.room_centers.is_empty());
        for center in &level.room_centers {
            assert!(level.grid.is_walkable(*center));
        }
    }

    #[test]
    fn doorways_are_framed_by_walls() {
        for seed in 0..4 {
            let level = level(seed, 63);
            for door in &level.doors {
                let jamb = match door.orientation {
                    Orientation::Vertical => Point::new(0, 1),
                    Orientation::Horizontal => Point::new(1, 0),
                };
                assert!(!level.grid.is_walkable(door.position + jamb));
                assert!(!level.grid.is_walkable(door.position - jamb));
                assert!(level.grid.is_walkable(door.position));
            }
        }
    }

    #[test]
    fn every_door_gets_a_key() {
        for seed in 0..6 {
            let level = level(seed, 63);
            let mut rng = StdRng::seed_from_u64(seed + 100);
            let (keys, _) = place_keys(&level, spawn_of(&level), &mut rng);
            assert_eq!(keys.len(), level.doors.len(), "seed {seed}");
        }
    }

    #[test]
    fn keys_never_fall_back_onto_the_spawn_block() {
        // One open block at the spawn, a doorway east of it and nothing else.
        let mut grid = Grid::new(9, Tile::wall("wall"));
        for x in 0..3 {
            for y in 0..3 {
                grid.set(Point::new(x, y), Tile::floor());
            }
        }
        let door = Point::new(4, 1);
        grid.set(door, Tile::new(TileKind::Doorway(Orientation::Vertical), "door"));
        let level = Level {
            grid,
            room_centers: vec![Point::new(1, 1)],
            doors: vec![DoorSite { position: door, orientation: Orientation::Vertical }],
        };

        let mut rng = StdRng::seed_from_u64(5);
        let (keys, _) = place_keys(&level, Point::new(1, 1), &mut rng);
        assert!(keys.is_empty());

        // With a second open block south of the spawn the key goes there instead.
        let mut level = level;
        for x in 0..3 {
            for y in 3..6 {
                level.grid.set(Point::new(x, y), Tile::floor());
            }
        }
        let (keys, _) = place_keys(&level, Point::new(1, 1), &mut rng);
        assert_eq!(keys.len(), 1);
        assert!(keys[0].position.y >= 3, "{:?}", keys[0].position);
    }

    #[test]
    fn keys_are_reachable_before_their_door() {
        for seed in 0..6 {
            let level = level(seed, 63);
            let spawn = spawn_of(&level);
            let mut rng = StdRng::seed_from_u64(seed + 200);
            let (keys, _) = place_keys(&level, spawn, &mut rng);

            for (k, key) in keys.iter().enumerate() {
                let opened_before: HashSet<Point> =
                    keys[..k].iter().map(|earlier| level.doors[earlier.door].position).collect();
                let door = level.doors[key.door].position;
                assert!(!opened_before.contains(&door));

                let reachable = flood_fill(&level.grid, spawn, &opened_before);
                assert!(
                    reachable.contains(&block_center(key.position)),
                    "seed {seed}: key for door {door:?} lies behind a locked door"
                );
                assert!(level.grid.is_walkable(key.position));
            }
        }
    }

    #[test]
    fn locked_doors_stop_the_flood_fill() {
        let mut grid = Grid::new(9, Tile::unknown());
        for x in 0..9 {
            grid.set(Point::new(x, 4), Tile::floor());
        }
        grid.set(Point::new(4, 4), Tile::new(TileKind::Doorway(Orientation::Vertical), "doorway_v"));

        let closed = flood_fill(&grid, Point::new(1, 4), &HashSet::new());
        assert!(closed.contains(&Point::new(4, 4)));
        assert!(!closed.contains(&Point::new(7, 4)));

        let open = flood_fill(&grid, Point::new(1, 4), &HashSet::from([Point::new(4, 4)]));
        assert!(open.contains(&Point::new(7, 4)));
    }

    #[test]
    fn totem_blocks_its_cells() {
        let mut grid = Grid::new(9, Tile::floor());
        raise_totem(&mut grid, Point::new(4, 4));
        assert!(!grid.is_walkable(Point::new(4, 3)));
        assert!(!grid.is_walkable(Point::new(5, 5)));
        assert!(grid.is_walkable(Point::new(3, 4)));
    }
}
