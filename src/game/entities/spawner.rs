use std::collections::HashSet;

use rand::Rng;

use crate::config::entities::SPAWN_RADIUS;
use crate::config::generator::PLACEMENT_ATTEMPTS;
use crate::game::grid::Grid;
use crate::game::types::Point;

use super::{EnemyKind, Entity, EntityKind};

/// Stationary hostile source standing on a totem.
#[derive(Debug)]
pub struct Spawner {
    pub spawns: EnemyKind,
}

impl Spawner {
    pub fn place(position: Point, spawns: EnemyKind) -> Entity {
        Entity::new(uuid::Uuid::new_v4().to_string(), position, EntityKind::Spawner(Spawner { spawns }))
    }

    /// A free walkable cell near `origin`, or `None` after too many misses.
    pub fn spawn_site<R: Rng + ?Sized>(
        origin: Point,
        grid: &Grid,
        occupied: &HashSet<Point>,
        rng: &mut R,
    ) -> Option<Point> {
        (0..PLACEMENT_ATTEMPTS)
            .map(|_| {
                origin
                    + Point::new(
                        rng.random_range(-SPAWN_RADIUS..=SPAWN_RADIUS),
                        rng.random_range(-SPAWN_RADIUS..=SPAWN_RADIUS),
                    )
            })
            .find(|p| grid.is_walkable(*p) && !occupied.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::game::grid::Tile;

    #[test]
    fn spawn_site_is_free_and_close() {
        let grid = Grid::new(20, Tile::floor());
        let origin = Point::new(10, 10);
        let occupied = HashSet::from([origin]);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            let site = Spawner::spawn_site(origin, &grid, &occupied, &mut rng).expect("open floor");
            assert_ne!(site, origin);
            assert!((site.x - origin.x).abs() <= SPAWN_RADIUS && (site.y - origin.y).abs() <= SPAWN_RADIUS);
        }
    }

    #[test]
    fn no_site_when_walled_in() {
        let grid = Grid::new(20, Tile::wall("void"));
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(Spawner::spawn_site(Point::new(10, 10), &grid, &HashSet::new(), &mut rng), None);
    }
}
