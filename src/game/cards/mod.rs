//! Ability cards: the static registry and per-player decks.

pub mod card;
pub mod deck;

pub use card::*;
pub use deck::*;
