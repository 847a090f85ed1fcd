//! Deck persistence.
//!
//! Game code only sees the [`DeckStore`] trait; the server wires in a concrete
//! backend. Writes are last-write-wins.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Persisted deck-building state of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDeck {
    pub active: Vec<String>,
    pub remaining: Vec<String>,
}

impl StoredDeck {
    /// Collection handed to a player seen for the first time.
    pub fn starter() -> Self {
        let own = |cards: &[&str]| -> Vec<String> { cards.iter().map(|c| c.to_string()).collect() };
        Self {
            active: own(&["spear", "spear", "magic dart", "magic dart", "axe", "heal", "haste", "fireball"]),
            remaining: own(&[
                "spear",
                "magic missile",
                "poison dart",
                "anger",
                "sharpen",
                "teleport",
                "heal",
            ]),
        }
    }
}

pub trait DeckStore: Send + Sync {
    /// Deck of `username`, created from the starter collection when missing.
    fn load_or_create(&self, username: &str) -> StoredDeck;
    fn save(&self, username: &str, deck: &StoredDeck);
}

/// Process-local store, lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryDeckStore {
    decks: Mutex<HashMap<String, StoredDeck>>,
}

impl InMemoryDeckStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeckStore for InMemoryDeckStore {
    fn load_or_create(&self, username: &str) -> StoredDeck {
        self.decks
            .lock()
            .entry(username.to_string())
            .or_insert_with(StoredDeck::starter)
            .clone()
    }

    fn save(&self, username: &str, deck: &StoredDeck) {
        self.decks.lock().insert(username.to_string(), deck.clone());
    }
}
