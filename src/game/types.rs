use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Integer grid coordinate, also used as a unit displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(self, other: Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The four orthogonal neighbours at the given distance.
    pub fn neighbours(self, step: i32) -> [Point; 4] {
        [
            Point::new(self.x + step, self.y),
            Point::new(self.x - step, self.y),
            Point::new(self.x, self.y + step),
            Point::new(self.x, self.y - step),
        ]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Point {
    type Output = Point;

    fn mul(self, rhs: i32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Facing of an entity. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn to_point(self) -> Point {
        match self {
            Direction::Up => Point::new(0, -1),
            Direction::Down => Point::new(0, 1),
            Direction::Left => Point::new(-1, 0),
            Direction::Right => Point::new(1, 0),
        }
    }

    /// Facing implied by a unit displacement; zero moves have none.
    pub fn from_move(step: Point) -> Option<Direction> {
        match (step.x.signum(), step.y.signum()) {
            (1, _) => Some(Direction::Right),
            (-1, _) => Some(Direction::Left),
            (_, 1) => Some(Direction::Down),
            (_, -1) => Some(Direction::Up),
            _ => None,
        }
    }

    /// Rotate a vector expressed relative to a downward facing into this facing.
    pub fn orient(self, relative: Point) -> Point {
        match self {
            Direction::Down => relative,
            Direction::Up => Point::new(-relative.x, -relative.y),
            Direction::Right => Point::new(relative.y, -relative.x),
            Direction::Left => Point::new(-relative.y, relative.x),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Lifecycle of a game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    NotStarted,
    Started,
}

/// Turn slot, selected by `turn % 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Player,
    AllyEntity,
    Enemy,
    EnemyEntity,
}

impl Phase {
    pub fn from_turn(turn: u64) -> Phase {
        match turn % 4 {
            0 => Phase::Player,
            1 => Phase::AllyEntity,
            2 => Phase::Enemy,
            _ => Phase::EnemyEntity,
        }
    }
}

/// Readiness of a player, both before and during a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    PreparingGame,
    ReadyForGame,
    NotReady,
    Ready,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Piercing,
    Healing,
    Fire,
    Magic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}
