//! Authoritative state of one game: board, entities, turn counter and the
//! lobby around them.

use std::collections::HashSet;

use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde_json::{Value, json};

use crate::config::game::{
    BOARD_SIZE, CHEST_COUNT, CHEST_LOOT_TABLE, MAX_ENEMIES, MAX_PLAYERS, PLAYER_COLORS, SPAWN_OFFSETS,
    SPAWNER_COUNT,
};
use crate::game::algorithms::visibility::compute_sight;
use crate::game::broadcast::{Outgoing, Target};
use crate::game::cards::deck::Deck;
use crate::game::entities::{
    Animation, Chest, Door, EnemyKind, Enemy, Entity, EntityId, Key, Player, Spawner,
};
use crate::game::error::{GameError, GameResult};
use crate::game::grid::generator::{block_center, generate, place_keys, raise_totem, sample_cell};
use crate::game::grid::{Grid, Item, Tile, TileKind};
use crate::game::types::{Direction, GamePhase, Point};
use crate::storage::StoredDeck;

pub struct Game {
    pub room_id: String,
    /// Only the owner's start launches the game.
    pub owner: Option<String>,
    pub phase: GamePhase,
    pub turn: u64,
    pub size: usize,
    pub grid: Grid,
    pub entities: Vec<Entity>,
    pub room_centers: Vec<Point>,
    pub spawn: Point,
    /// Set once any player's sight changed since the last export.
    pub visibility_dirty: bool,
    /// The room is shutting down; the tick thread exits.
    pub closed: bool,
    pub(crate) removed: Vec<EntityId>,
    pub(crate) rng: StdRng,
    outbox: Vec<Outgoing>,
    colors: Vec<String>,
}

impl Game {
    pub fn new(room_id: impl Into<String>, owner: Option<String>) -> Self {
        Self::with_rng(room_id, owner, BOARD_SIZE, StdRng::from_os_rng())
    }

    pub fn with_rng(room_id: impl Into<String>, owner: Option<String>, size: usize, rng: StdRng) -> Self {
        Self {
            room_id: room_id.into(),
            owner,
            phase: GamePhase::NotStarted,
            turn: 0,
            size,
            grid: Grid::new(size, Tile::unknown()),
            entities: Vec::new(),
            room_centers: Vec::new(),
            spawn: Point::ZERO,
            visibility_dirty: false,
            closed: false,
            removed: Vec::new(),
            rng,
            outbox: Vec::new(),
            colors: PLAYER_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// The tick thread has work to do.
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Started && !self.closed
    }

    pub fn emit(&mut self, event: &'static str, payload: Value, target: Target) {
        self.outbox.push(Outgoing { event, payload, target });
    }

    /// Report an error to the participant it concerns.
    pub fn notify(&mut self, username: &str, error: &GameError) {
        self.emit(error.event(), json!(error.to_string()), Target::Participant(username.to_string()));
    }

    pub fn drain_outbox(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outbox)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.entities.iter().filter_map(Entity::as_player)
    }

    pub fn player(&self, username: &str) -> Option<&Player> {
        self.player_entity(username).and_then(Entity::as_player)
    }

    pub fn player_entity(&self, username: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_player() && e.id == username)
    }

    pub fn player_entity_mut(&mut self, username: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.is_player() && e.id == username)
    }

    fn player_or_err(&mut self, username: &str) -> GameResult<&mut Entity> {
        self.player_entity_mut(username)
            .ok_or_else(|| GameError::invalid_action("You are not a player in this game."))
    }

    pub fn usernames(&self) -> Vec<String> {
        self.players().map(|p| p.username.clone()).collect()
    }

    /// Cells holding a live entity that blocks movement.
    pub fn occupied(&self) -> HashSet<Point> {
        self.entities
            .iter()
            .filter(|e| e.alive && !e.can_move_through)
            .map(|e| e.position)
            .collect()
    }

    fn lobby(&self) -> Value {
        let players: Vec<Value> = self
            .players()
            .map(|p| {
                json!({
                    "username": p.username,
                    "color": p.color,
                    "state": p.state,
                    "owner": self.owner.as_deref() == Some(p.username.as_str()),
                })
            })
            .collect();
        json!({ "players": players, "started": self.phase == GamePhase::Started })
    }

    pub fn update_players(&mut self) {
        let lobby = self.lobby();
        self.emit("join", lobby, Target::Room);
    }

    pub fn join(&mut self, username: &str, deck: Deck) -> GameResult<()> {
        if self.player_entity(username).is_some() {
            info!("[Game {}] {} rejoined", self.room_id, username);
            self.update_players();
            self.send_deck(username);
            if self.phase == GamePhase::Started {
                self.send_full_state(username);
            }
            return Ok(());
        }

        if self.phase == GamePhase::Started {
            return Err(GameError::invalid_action("The game has already started, you are spectating."));
        }
        if self.players().count() >= MAX_PLAYERS {
            return Err(GameError::invalid_action("This game is full, you are spectating."));
        }
        let Some(color) = self.colors.pop() else {
            return Err(GameError::invalid_action("No color left for you, you are spectating."));
        };

        info!("[Game {}] {} joined as {}", self.room_id, username, color);
        self.entities.push(Player::spawn(username, &color, deck));
        self.update_players();
        self.send_deck(username);
        Ok(())
    }

    pub fn leave(&mut self, username: &str) {
        let Some(index) = self.entities.iter().position(|e| e.is_player() && e.id == username) else {
            return;
        };
        let entity = self.entities.remove(index);
        if let Some(player) = entity.as_player() {
            self.colors.push(player.color.clone());
        }
        self.removed.push(entity.id);
        info!("[Game {}] {} left", self.room_id, username);
        self.emit("leave", json!({ "username": username }), Target::Room);
        self.update_players();

        if self.players().next().is_none() && self.phase == GamePhase::Started {
            info!("[Game {}] last player left, stopping", self.room_id);
            self.phase = GamePhase::NotStarted;
            self.turn = 0;
        }
    }

    pub fn change_color(&mut self, username: &str, color: &str) -> GameResult<()> {
        let Some(index) = self.colors.iter().position(|c| c == color) else {
            return Err(GameError::invalid_action(format!("The color '{color}' is not available.")));
        };
        let player = self
            .player_or_err(username)?
            .as_player_mut()
            .ok_or_else(|| GameError::invalid_action("You are not a player in this game."))?;
        let previous = std::mem::replace(&mut player.color, color.to_string());
        self.colors[index] = previous;
        self.update_players();
        Ok(())
    }

    /// Readiness toggle from the lobby. The owner's call also launches the
    /// game; returns whether it did.
    pub fn start(&mut self, username: &str) -> GameResult<bool> {
        let started = self.phase == GamePhase::Started;
        let entity = self.player_or_err(username)?;
        if !started {
            if let Some(player) = entity.as_player_mut() {
                player.toggle_ready()?;
            }
        }

        if self.owner.as_deref() != Some(username) || started {
            self.update_players();
            return Ok(false);
        }

        self.emit("loading", json!("Generating game..."), Target::Room);
        self.launch()?;
        self.emit("start", Value::Null, Target::Room);
        Ok(true)
    }

    /// Throw the current level away and start over.
    pub fn restart(&mut self) -> GameResult<()> {
        info!("[Game {}] restarting", self.room_id);
        self.phase = GamePhase::NotStarted;
        self.emit("loading", json!("Generating game..."), Target::Room);
        self.launch()?;
        self.emit("start", Value::Null, Target::Room);
        Ok(())
    }

    fn launch(&mut self) -> GameResult<()> {
        let mut level = match generate(self.size, &mut self.rng) {
            Ok(level) => level,
            Err(e) => {
                error!("[Game {}] cannot generate level: {}", self.room_id, e);
                self.emit(e.event(), json!({ "code": e.code(), "message": e.to_string() }), Target::Room);
                return Err(e);
            }
        };

        let mut centers = level.room_centers.clone();
        centers.shuffle(&mut self.rng);
        let spawn = match centers.pop() {
            Some(center) => center,
            None => level
                .grid
                .walkable_points()
                .first()
                .map(|p| block_center(*p))
                .ok_or_else(|| GameError::Configuration("generated level has no floor".to_string()))?,
        };

        let spawner_sites: Vec<Point> = centers.drain(..SPAWNER_COUNT.min(centers.len())).collect();
        for site in &spawner_sites {
            raise_totem(&mut level.grid, *site);
        }
        let (keys, reachable) = place_keys(&level, spawn, &mut self.rng);

        // Everything but the players goes; clients are told to forget it.
        let stale: Vec<EntityId> = self.entities.iter().filter(|e| !e.is_player()).map(|e| e.id.clone()).collect();
        self.removed.extend(stale);
        self.entities.retain(Entity::is_player);

        for (slot, entity) in self.entities.iter_mut().enumerate() {
            let (dx, dy) = SPAWN_OFFSETS[slot % SPAWN_OFFSETS.len()];
            entity.position = spawn + Point::new(dx, dy);
            entity.direction = Direction::Down;
            entity.alive = true;
            entity.animation = Animation::default();
            if let Some(motion) = entity.motion.as_mut() {
                motion.stop();
            }
            if let Some(player) = entity.as_player_mut() {
                player.start(&mut self.rng);
            }
        }

        for site in &spawner_sites {
            self.entities.push(Spawner::place(*site, EnemyKind::Slime));
        }
        let mut door_ids = Vec::with_capacity(level.doors.len());
        for site in &level.doors {
            let door = Door::place(site);
            door_ids.push(door.id.clone());
            self.entities.push(door);
        }
        for key in keys {
            if let Some(door_id) = door_ids.get(key.door) {
                self.entities.push(Key::place(door_id.clone(), key.position));
            }
        }

        self.grid = level.grid;
        self.room_centers = level.room_centers;
        self.spawn = spawn;
        let chests = self.place_chests(&reachable);
        self.populate_rooms(&centers);
        self.place_objectives();

        self.phase = GamePhase::Started;
        self.turn = 0;
        self.refresh_all_sight();
        self.visibility_dirty = true;

        info!(
            "[Game {}] started: players={} doors={} chests={} entities={}",
            self.room_id,
            self.players().count(),
            door_ids.len(),
            chests,
            self.entities.len()
        );
        for username in self.usernames() {
            self.send_full_state(&username);
        }
        Ok(())
    }

    fn place_chests(&mut self, reachable: &[Point]) -> usize {
        let anchors: Vec<Point> = reachable
            .iter()
            .copied()
            .filter(|p| self.grid.get(*p).is_some_and(|t| t.kind == TileKind::Floor))
            .collect();
        let mut occupied: HashSet<Point> = self.entities.iter().map(|e| e.position).collect();

        let mut placed = 0;
        for _ in 0..CHEST_COUNT {
            let Some(cell) = sample_cell(&self.grid, &anchors, |p| occupied.contains(&p), &mut self.rng) else {
                continue;
            };
            let loot = CHEST_LOOT_TABLE
                .choose_weighted(&mut self.rng, |(weight, _)| *weight)
                .ok()
                .map(|(_, name)| name.to_string());
            occupied.insert(cell);
            self.entities.push(Chest::place(cell, loot));
            placed += 1;
        }
        placed
    }

    /// One hostile in every room that is neither the spawn nor a spawner.
    fn populate_rooms(&mut self, centers: &[Point]) {
        let occupied: HashSet<Point> = self.entities.iter().map(|e| e.position).collect();
        let mut hostiles = self.entities.iter().filter(|e| e.is_enemy()).count();
        for center in centers {
            if hostiles >= MAX_ENEMIES {
                break;
            }
            if occupied.contains(center) {
                continue;
            }
            let kind = EnemyKind::ALL.choose(&mut self.rng).copied().unwrap_or(EnemyKind::Slime);
            self.entities.push(Enemy::spawn(kind, *center));
            hostiles += 1;
        }
    }

    /// Drop every player's objective item on a random free floor tile.
    fn place_objectives(&mut self) {
        let occupied: HashSet<Point> = self.entities.iter().map(|e| e.position).collect();
        let colors: Vec<String> = self.players().map(|p| p.color.clone()).collect();
        for color in colors {
            let free: Vec<Point> = self
                .grid
                .points()
                .filter(|p| {
                    self.grid
                        .get(*p)
                        .is_some_and(|t| t.kind == TileKind::Floor && t.item.is_none())
                        && !occupied.contains(p)
                })
                .collect();
            let Some(cell) = free.choose(&mut self.rng).copied() else {
                continue;
            };
            if let Some(tile) = self.grid.get_mut(cell) {
                tile.item = Some(Item::Collector { color });
            }
        }
    }

    /// Recompute the sight of every player whose position or facing changed.
    /// Returns whether any did.
    pub fn refresh_all_sight(&mut self) -> bool {
        let mut changed = false;
        for entity in &mut self.entities {
            changed |= refresh_sight(&self.grid, entity);
        }
        if changed {
            self.visibility_dirty = true;
        }
        changed
    }

    pub fn send_deck(&mut self, username: &str) {
        let Some(player) = self.player(username) else {
            return;
        };
        let active = json!(player.deck.active_cards());
        let remaining = json!(player.deck.remaining_cards());
        let target = Target::Participant(username.to_string());
        self.emit("deck_cards", active, target.clone());
        self.emit("remaining_cards", remaining, target);
    }

    fn edit_deck(
        &mut self,
        username: &str,
        edit: impl FnOnce(&mut Deck) -> GameResult<()>,
    ) -> GameResult<StoredDeck> {
        if self.phase == GamePhase::Started {
            return Err(GameError::invalid_action("You cannot change your deck during a game."));
        }
        let player = self
            .player_or_err(username)?
            .as_player_mut()
            .ok_or_else(|| GameError::invalid_action("You are not a player in this game."))?;
        edit(&mut player.deck)?;
        let stored = player.deck.to_stored();
        self.send_deck(username);
        Ok(stored)
    }

    /// Move a card into the active deck. Returns the deck to persist.
    pub fn add_card(&mut self, username: &str, card: &str) -> GameResult<StoredDeck> {
        self.edit_deck(username, |deck| deck.add_card(card))
    }

    pub fn remove_card(&mut self, username: &str, card: &str) -> GameResult<StoredDeck> {
        self.edit_deck(username, |deck| deck.remove_card(card))
    }
}

/// Recompute a player's sight if it moved or turned since the last time.
pub fn refresh_sight(grid: &Grid, entity: &mut Entity) -> bool {
    let seen = (entity.position, entity.direction);
    let Some(player) = entity.as_player_mut() else {
        return false;
    };
    if player.last_seen == Some(seen) {
        return false;
    }
    player.sight = compute_sight(grid, seen.0, seen.1);
    player.last_seen = Some(seen);
    player.sight_updates += 1;
    true
}
