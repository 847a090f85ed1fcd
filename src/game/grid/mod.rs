//! Board model: tiles, the square grid holding them, and the level generator.

pub mod tile;
pub mod grid;
pub mod generator;

pub use tile::*;
pub use grid::*;
