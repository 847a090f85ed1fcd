/// Main configuration module.
/// 
/// Re-exports submodules for game, level generation, entity and server configuration.
pub mod game;
pub mod generator;
pub mod entities;
pub mod server;
