pub mod pathfinding;
pub mod visibility;
