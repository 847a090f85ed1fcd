use crate::game::grid::tile::Tile;
use crate::game::types::Point;

/// Square board of tiles, indexed by `Point { x, y }`.
#[derive(Debug, Clone)]
pub struct Grid {
    size: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(size: usize, fill: Tile) -> Self {
        Self { size, tiles: vec![fill; size * size] }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.size && (p.y as usize) < self.size
    }

    fn index(&self, p: Point) -> Option<usize> {
        self.in_bounds(p).then(|| p.y as usize * self.size + p.x as usize)
    }

    pub fn get(&self, p: Point) -> Option<&Tile> {
        self.index(p).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, p: Point) -> Option<&mut Tile> {
        self.index(p).map(move |i| &mut self.tiles[i])
    }

    /// Replace a tile. Out-of-bounds writes are ignored.
    pub fn set(&mut self, p: Point, tile: Tile) {
        if let Some(slot) = self.get_mut(p) {
            *slot = tile;
        }
    }

    /// Out-of-bounds cells are never walkable.
    pub fn is_walkable(&self, p: Point) -> bool {
        self.get(p).is_some_and(Tile::walkable)
    }

    /// Out-of-bounds cells are treated as opaque.
    pub fn is_opaque(&self, p: Point) -> bool {
        self.get(p).is_none_or(Tile::opaque)
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let size = self.size as i32;
        (0..size).flat_map(move |y| (0..size).map(move |x| Point::new(x, y)))
    }

    pub fn walkable_points(&self) -> Vec<Point> {
        self.points().filter(|p| self.is_walkable(*p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::tile::TileKind;

    #[test]
    fn grid_generation_size() {
        let grid = Grid::new(9, Tile::floor());
        assert_eq!(grid.size(), 9);
        assert_eq!(grid.points().count(), 81);
    }

    #[test]
    fn out_of_bounds_is_blocked_and_opaque() {
        let grid = Grid::new(3, Tile::floor());
        assert!(grid.is_walkable(Point::new(2, 2)));
        assert!(!grid.is_walkable(Point::new(3, 0)));
        assert!(!grid.is_walkable(Point::new(0, -1)));
        assert!(grid.is_opaque(Point::new(-1, 0)));
        assert!(!grid.is_opaque(Point::new(1, 1)));
    }

    #[test]
    fn set_replaces_only_in_bounds() {
        let mut grid = Grid::new(3, Tile::floor());
        grid.set(Point::new(1, 2), Tile::wall("edge_b"));
        grid.set(Point::new(5, 5), Tile::wall("edge_b"));
        assert_eq!(grid.get(Point::new(1, 2)).map(|t| t.kind), Some(TileKind::Wall));
        assert_eq!(grid.walkable_points().len(), 8);
    }
}
