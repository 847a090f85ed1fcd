pub mod algorithms;
pub mod broadcast;
pub mod cards;
pub mod commands;
pub mod entities;
pub mod error;
pub mod export;
pub mod game_loop;
pub mod grid;
pub mod scheduler;
pub mod state;
pub mod types;


pub use error::{GameError, GameResult};
pub use game_loop::GameRoom;
pub use state::Game;
