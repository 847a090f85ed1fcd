//! A player's cards: the persisted deck-building lists and the in-game piles.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::config::entities::{HAND_SIZE, MAX_DECK_SIZE};
use crate::game::cards::card::{Card, card_info};
use crate::game::error::{GameError, GameResult};
use crate::storage::StoredDeck;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Deck {
    /// Cards taken into a game.
    pub active: Vec<String>,
    /// Owned cards not in the active list.
    pub remaining: Vec<String>,
    pub hand: Vec<String>,
    #[serde(skip)]
    draw_pile: Vec<String>,
    #[serde(skip)]
    discard: Vec<String>,
}

impl Deck {
    pub fn new(active: Vec<String>, remaining: Vec<String>) -> Self {
        Self { active, remaining, ..Self::default() }
    }

    pub fn from_stored(stored: &StoredDeck) -> Self {
        Self::new(stored.active.clone(), stored.remaining.clone())
    }

    pub fn to_stored(&self) -> StoredDeck {
        StoredDeck { active: self.active.clone(), remaining: self.remaining.clone() }
    }

    pub fn add_card(&mut self, name: &str) -> GameResult<()> {
        if card_info(name).is_none() {
            return Err(GameError::invalid_action("You tried to add a card which doesn't exist."));
        }
        if self.active.len() >= MAX_DECK_SIZE {
            return Err(GameError::invalid_action(format!(
                "Your deck already contains the maximum allowed amount ({MAX_DECK_SIZE}) of cards."
            )));
        }
        let Some(index) = self.remaining.iter().position(|c| c == name) else {
            return Err(GameError::invalid_action(format!("You do not have any '{name}' left.")));
        };
        let card = self.remaining.remove(index);
        self.active.push(card);
        Ok(())
    }

    pub fn remove_card(&mut self, name: &str) -> GameResult<()> {
        let Some(index) = self.active.iter().position(|c| c == name) else {
            return Err(GameError::invalid_action("You tried to remove a card which was not in your deck."));
        };
        let card = self.active.remove(index);
        self.remaining.push(card);
        Ok(())
    }

    /// Shuffle the active list into a fresh draw pile and deal a hand.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.hand.clear();
        self.discard.clear();
        self.draw_pile = self.active.clone();
        self.draw_pile.shuffle(rng);
        self.fill_hand(rng);
    }

    /// Next card of the draw pile, reshuffling the discard pile when it runs out.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        if self.draw_pile.is_empty() {
            self.draw_pile = std::mem::take(&mut self.discard);
            self.draw_pile.shuffle(rng);
        }
        self.draw_pile.pop()
    }

    fn fill_hand<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        while self.hand.len() < HAND_SIZE {
            match self.draw(rng) {
                Some(card) => self.hand.push(card),
                None => break,
            }
        }
    }

    /// Take a card out of the hand, discard it and draw a replacement.
    pub fn play<R: Rng + ?Sized>(&mut self, slot: usize, rng: &mut R) -> GameResult<String> {
        if slot >= self.hand.len() {
            return Err(GameError::invalid_action("There is no card in that slot."));
        }
        let card = self.hand.remove(slot);
        self.discard.push(card.clone());
        self.fill_hand(rng);
        Ok(card)
    }

    pub fn hand_cards(&self) -> Vec<&'static Card> {
        self.hand.iter().filter_map(|name| card_info(name)).collect()
    }

    pub fn active_cards(&self) -> Vec<&'static Card> {
        self.active.iter().filter_map(|name| card_info(name)).collect()
    }

    pub fn remaining_cards(&self) -> Vec<&'static Card> {
        self.remaining.iter().filter_map(|name| card_info(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn names(cards: &[&str]) -> Vec<String> {
        cards.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn moving_cards_between_lists() {
        let mut deck = Deck::new(names(&["spear"]), names(&["heal", "axe"]));
        deck.add_card("heal").unwrap();
        assert_eq!(deck.active, names(&["spear", "heal"]));
        assert!(deck.add_card("heal").is_err());
        assert!(deck.add_card("nothing").is_err());

        deck.remove_card("spear").unwrap();
        assert_eq!(deck.remaining, names(&["axe", "spear"]));
        assert!(deck.remove_card("spear").is_err());
    }

    #[test]
    fn active_list_is_capped() {
        let mut deck = Deck::new(vec!["spear".to_string(); MAX_DECK_SIZE], names(&["axe"]));
        assert!(matches!(deck.add_card("axe"), Err(GameError::InvalidAction(_))));
    }

    #[test]
    fn hand_is_refilled_and_discard_recycled() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = Deck::new(names(&["spear", "axe", "heal", "haste", "fireball"]), vec![]);
        deck.start(&mut rng);
        assert_eq!(deck.hand.len(), HAND_SIZE);

        for _ in 0..12 {
            deck.play(0, &mut rng).unwrap();
            assert_eq!(deck.hand.len(), HAND_SIZE);
        }
        assert!(deck.play(HAND_SIZE, &mut rng).is_err());
    }
}
