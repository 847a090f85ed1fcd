//! Player entities and their input handling.

use std::collections::HashSet;

use rand::Rng;

use crate::config::entities::{
    PLAYER_MAX_HP, PLAYER_MAX_MANA, PLAYER_MAX_MOVEMENT, PLAYER_MOVEMENT_COOLDOWN, PLAYER_START_MANA,
};
use crate::game::cards::card::card_info;
use crate::game::cards::deck::Deck;
use crate::game::error::{GameError, GameResult};
use crate::game::grid::Item;
use crate::game::types::{Direction, PlayerState, Point};

use super::{Damageable, Entity, EntityKind, Motion, Passive, Stat};

#[derive(Debug)]
pub struct Player {
    pub username: String,
    pub color: String,
    pub state: PlayerState,
    pub hp: Stat,
    pub mana: Stat,
    pub deck: Deck,
    pub passives: Vec<Passive>,
    /// Keys picked up during the game.
    pub inventory: Vec<Item>,
    /// Objective item being carried.
    pub held: Option<Item>,
    /// Moves planned for the next player phase.
    pub planned: Vec<Point>,
    /// Hand slot to play at the end of the next player phase.
    pub selected: Option<usize>,
    pub movement_cap: usize,
    pub sight: HashSet<Point>,
    /// Position and facing the current sight was computed from.
    pub last_seen: Option<(Point, Direction)>,
    /// Times the sight has been recomputed.
    pub sight_updates: u64,
    /// Death has been announced and the held item dropped.
    pub death_handled: bool,
}

impl Player {
    pub fn spawn(username: &str, color: &str, deck: Deck) -> Entity {
        let player = Player {
            username: username.to_string(),
            color: color.to_string(),
            state: PlayerState::PreparingGame,
            hp: Stat::full(PLAYER_MAX_HP),
            mana: Stat::new(PLAYER_START_MANA, PLAYER_MAX_MANA),
            deck,
            passives: Vec::new(),
            inventory: Vec::new(),
            held: None,
            planned: Vec::new(),
            selected: None,
            movement_cap: PLAYER_MAX_MOVEMENT,
            sight: HashSet::new(),
            last_seen: None,
            sight_updates: 0,
            death_handled: false,
        };
        Entity::new(username, Point::ZERO, EntityKind::Player(Box::new(player)))
            .with_motion(Motion::new(PLAYER_MOVEMENT_COOLDOWN))
    }

    /// Reset everything for a fresh game.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.state = PlayerState::NotReady;
        self.hp = Stat::full(PLAYER_MAX_HP);
        self.mana = Stat::new(PLAYER_START_MANA, PLAYER_MAX_MANA);
        self.passives.clear();
        self.inventory.clear();
        self.held = None;
        self.planned.clear();
        self.selected = None;
        self.movement_cap = PLAYER_MAX_MOVEMENT;
        self.sight.clear();
        self.last_seen = None;
        self.death_handled = false;
        self.deck.start(rng);
    }

    /// Pre-game readiness toggle.
    pub fn toggle_ready(&mut self) -> GameResult<()> {
        if self.deck.active.is_empty() {
            return Err(GameError::invalid_action(
                "You cannot start the game without adding cards to your deck first!",
            ));
        }
        self.state = match self.state {
            PlayerState::PreparingGame => PlayerState::ReadyForGame,
            PlayerState::ReadyForGame => PlayerState::PreparingGame,
            other => other,
        };
        Ok(())
    }

    /// Handle an in-game key press.
    pub fn prepare_action(&mut self, key: &str, extra: Option<u32>) -> GameResult<()> {
        match self.state {
            PlayerState::Processing => {
                return Err(GameError::invalid_action("Your actions are being processed."));
            }
            PlayerState::PreparingGame | PlayerState::ReadyForGame => {
                return Err(GameError::invalid_action("The game has not started yet."));
            }
            PlayerState::NotReady | PlayerState::Ready => {}
        }

        if key == "Enter" {
            self.state = match self.state {
                PlayerState::Ready => PlayerState::NotReady,
                _ => PlayerState::Ready,
            };
            return Ok(());
        }
        if self.state == PlayerState::Ready {
            return Err(GameError::invalid_action("You are ready. Press Enter to change your plan."));
        }

        if let Ok(slot) = key.parse::<usize>() {
            return self.select_card(slot);
        }

        let step = match key {
            "ArrowUp" => Direction::Up,
            "ArrowDown" => Direction::Down,
            "ArrowLeft" => Direction::Left,
            "ArrowRight" => Direction::Right,
            _ => return Err(GameError::invalid_action(format!("Unknown action '{key}'."))),
        }
        .to_point();

        for _ in 0..extra.unwrap_or(1).max(1) {
            self.plan_move(step)?;
        }
        Ok(())
    }

    /// Add a step to the plan. Stepping back the way the last step came cancels
    /// that step instead.
    pub fn plan_move(&mut self, step: Point) -> GameResult<()> {
        if self.planned.last() == Some(&-step) {
            self.planned.pop();
            return Ok(());
        }
        if self.planned.len() >= self.movement_cap {
            return Err(GameError::invalid_action("You cannot move any further this turn."));
        }
        self.planned.push(step);
        Ok(())
    }

    /// Select a hand slot, or deselect it when already selected.
    pub fn select_card(&mut self, slot: usize) -> GameResult<()> {
        let Some(name) = self.deck.hand.get(slot) else {
            return Err(GameError::invalid_action("There is no card in that slot."));
        };
        let cost = card_info(name).map_or(0, |card| card.cost);
        if self.mana.value < cost {
            return Err(GameError::invalid_action("You do not have enough mana for that card."));
        }
        self.selected = if self.selected == Some(slot) { None } else { Some(slot) };
        Ok(())
    }

    pub fn holds_key(&self, door_id: &str) -> bool {
        self.inventory
            .iter()
            .any(|item| matches!(item, Item::Key { door_id: id } if id == door_id))
    }
}

impl Damageable for Player {
    fn health(&self) -> &Stat {
        &self.hp
    }

    fn health_mut(&mut self) -> &mut Stat {
        &mut self.hp
    }

    fn mana_mut(&mut self) -> Option<&mut Stat> {
        Some(&mut self.mana)
    }

    fn passives(&self) -> &[Passive] {
        &self.passives
    }

    fn passives_mut(&mut self) -> &mut Vec<Passive> {
        &mut self.passives
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::storage::StoredDeck;

    fn in_game() -> Player {
        let entity = Player::spawn("ann", "blue", Deck::from_stored(&StoredDeck::starter()));
        let EntityKind::Player(player) = entity.kind else {
            unreachable!("spawned a player");
        };
        let mut player = *player;
        player.start(&mut StdRng::seed_from_u64(1));
        player
    }

    #[test]
    fn empty_deck_cannot_ready() {
        let entity = Player::spawn("bob", "red", Deck::default());
        let EntityKind::Player(mut player) = entity.kind else {
            unreachable!("spawned a player");
        };
        assert!(matches!(player.toggle_ready(), Err(GameError::InvalidAction(_))));
        assert_eq!(player.state, PlayerState::PreparingGame);
    }

    #[test]
    fn enter_toggles_readiness_both_ways() {
        let mut player = in_game();
        player.prepare_action("Enter", None).unwrap();
        assert_eq!(player.state, PlayerState::Ready);
        player.prepare_action("Enter", None).unwrap();
        assert_eq!(player.state, PlayerState::NotReady);
    }

    #[test]
    fn ready_players_cannot_plan() {
        let mut player = in_game();
        player.prepare_action("Enter", None).unwrap();
        assert!(player.prepare_action("ArrowUp", None).is_err());
        assert!(player.planned.is_empty());
    }

    #[test]
    fn opposite_move_cancels_the_last_step() {
        let mut player = in_game();
        player.prepare_action("ArrowRight", Some(3)).unwrap();
        player.prepare_action("ArrowLeft", None).unwrap();
        assert_eq!(player.planned, vec![Point::new(1, 0); 2]);
    }

    #[test]
    fn plan_is_capped() {
        let mut player = in_game();
        let cap = player.movement_cap;
        assert!(player.prepare_action("ArrowDown", Some(cap as u32 + 1)).is_err());
        assert_eq!(player.planned.len(), cap);
    }

    #[test]
    fn selecting_a_slot_twice_deselects_it() {
        let mut player = in_game();
        player.mana = Stat::full(PLAYER_MAX_MANA);
        player.prepare_action("0", None).unwrap();
        assert_eq!(player.selected, Some(0));
        player.prepare_action("0", None).unwrap();
        assert_eq!(player.selected, None);
        assert!(player.prepare_action("9", None).is_err());
    }

    #[test]
    fn processing_rejects_input() {
        let mut player = in_game();
        player.state = PlayerState::Processing;
        assert!(player.prepare_action("Enter", None).is_err());
    }
}
