//! Per-player state payloads.
//!
//! Every tick each player gets a reduced `game_state` export. The visible
//! tiles and entities only travel when some sight changed since the last
//! export; the full export (on start and on request) always carries them
//! along with the board size.

use std::collections::HashSet;

use log::error;
use serde::Serialize;

use crate::game::broadcast::Target;
use crate::game::cards::card::Card;
use crate::game::entities::{Animation, Entity, EntityId, EntityKind, EntityView, Passive, Stat};
use crate::game::grid::{Item, TileView};
use crate::game::state::Game;
use crate::game::types::{Direction, GamePhase, Phase, PlayerState, Point};

/// Public state of a player, sent to everyone.
#[derive(Debug, Serialize)]
pub struct PlayerView<'a> {
    pub username: &'a str,
    pub color: &'a str,
    pub state: PlayerState,
    pub alive: bool,
    pub hp: Stat,
    pub mana: Stat,
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub animation: &'a Animation,
    pub held: Option<&'a Item>,
    pub planned: &'a [Point],
}

/// Private state of the receiving player.
#[derive(Debug, Serialize)]
pub struct PlayerData<'a> {
    pub hand: Vec<&'static Card>,
    pub selected: Option<usize>,
    pub passives: &'a [Passive],
    pub inventory: &'a [Item],
    pub movement_cap: usize,
}

#[derive(Debug, Serialize)]
pub struct VisibleTile<'a> {
    pub x: i32,
    pub y: i32,
    pub tile: TileView<'a>,
}

#[derive(Debug, Serialize)]
pub struct StateExport<'a> {
    pub started: bool,
    pub turn: u64,
    pub phase: Phase,
    pub player_data: Option<PlayerData<'a>>,
    pub all_players: Vec<PlayerView<'a>>,
    pub removed_entity_ids: &'a [EntityId],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_tiles: Option<&'a [VisibleTile<'a>]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_entities: Option<&'a [EntityView<'a>]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_size: Option<usize>,
}

fn player_view(entity: &Entity) -> Option<PlayerView<'_>> {
    let player = entity.as_player()?;
    let (x, y) = entity.display_position();
    Some(PlayerView {
        username: &player.username,
        color: &player.color,
        state: player.state,
        alive: entity.alive,
        hp: player.hp,
        mana: player.mana,
        x,
        y,
        direction: entity.direction,
        animation: &entity.animation,
        held: player.held.as_ref(),
        planned: &player.planned,
    })
}

fn player_data(entity: &Entity) -> Option<PlayerData<'_>> {
    let player = entity.as_player()?;
    Some(PlayerData {
        hand: player.deck.hand_cards(),
        selected: player.selected,
        passives: &player.passives,
        inventory: &player.inventory,
        movement_cap: player.movement_cap,
    })
}

impl Game {
    /// Cells seen by at least one living player.
    pub fn visible_union(&self) -> HashSet<Point> {
        self.entities
            .iter()
            .filter(|e| e.alive)
            .filter_map(Entity::as_player)
            .flat_map(|p| p.sight.iter().copied())
            .collect()
    }

    fn visible_payload(&self) -> (Vec<VisibleTile<'_>>, Vec<EntityView<'_>>) {
        let union = self.visible_union();
        let mut cells: Vec<Point> = union.iter().copied().collect();
        cells.sort_unstable();
        let tiles = cells
            .into_iter()
            .filter_map(|p| self.grid.get(p).map(|tile| VisibleTile { x: p.x, y: p.y, tile: tile.view() }))
            .collect();
        let entities = self
            .entities
            .iter()
            .filter(|e| e.alive && !matches!(e.kind, EntityKind::Player(_)) && union.contains(&e.position))
            .map(Entity::view)
            .collect();
        (tiles, entities)
    }

    fn export_for<'a>(
        &'a self,
        username: &str,
        removed: &'a [EntityId],
        visible: Option<&'a (Vec<VisibleTile<'a>>, Vec<EntityView<'a>>)>,
        board_size: Option<usize>,
    ) -> StateExport<'a> {
        StateExport {
            started: self.phase == GamePhase::Started,
            turn: self.turn,
            phase: Phase::from_turn(self.turn),
            player_data: self.player_entity(username).and_then(player_data),
            all_players: self.entities.iter().filter_map(player_view).collect(),
            removed_entity_ids: removed,
            visible_tiles: visible.map(|(tiles, _)| tiles.as_slice()),
            visible_entities: visible.map(|(_, entities)| entities.as_slice()),
            board_size,
        }
    }

    /// Reduced export to every player. Removed ids are handed out once.
    pub fn export_tick(&mut self) {
        let removed = std::mem::take(&mut self.removed);
        let dirty = std::mem::replace(&mut self.visibility_dirty, false);

        let mut messages = Vec::new();
        {
            let visible = dirty.then(|| self.visible_payload());
            for username in self.usernames() {
                let export = self.export_for(&username, &removed, visible.as_ref(), None);
                match serde_json::to_value(&export) {
                    Ok(payload) => messages.push((username, payload)),
                    Err(e) => error!("[Game {}] cannot serialize state for {}: {}", self.room_id, username, e),
                }
            }
        }
        for (username, payload) in messages {
            self.emit("game_state", payload, Target::Participant(username));
        }
    }

    /// Full export, including the board size and everything currently visible.
    pub fn send_full_state(&mut self, username: &str) {
        let payload = {
            let visible = self.visible_payload();
            let export = self.export_for(username, &[], Some(&visible), Some(self.size));
            serde_json::to_value(&export)
        };
        match payload {
            Ok(payload) => self.emit("game_state", payload, Target::Participant(username.to_string())),
            Err(e) => error!("[Game {}] cannot serialize full state for {}: {}", self.room_id, username, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::game::cards::deck::Deck;
    use crate::game::entities::{Enemy, EnemyKind, Player};
    use crate::game::grid::{Grid, Tile};
    use crate::storage::StoredDeck;

    fn running() -> Game {
        let mut game = Game::with_rng("export", None, 9, StdRng::seed_from_u64(5));
        game.grid = Grid::new(9, Tile::floor());
        game.phase = GamePhase::Started;
        let mut ann = Player::spawn("ann", "blue", Deck::from_stored(&StoredDeck::starter()));
        ann.position = Point::new(4, 1);
        game.entities.push(ann);
        game.entities.push(Enemy::spawn(EnemyKind::Slime, Point::new(4, 3)));
        game.refresh_all_sight();
        game
    }

    fn last_state(game: &mut Game) -> serde_json::Value {
        game.drain_outbox()
            .into_iter()
            .filter(|o| o.event == "game_state")
            .map(|o| o.payload)
            .last()
            .unwrap_or_default()
    }

    #[test]
    fn visible_fields_only_when_dirty() {
        let mut game = running();
        game.export_tick();
        let first = last_state(&mut game);
        assert!(first.get("visible_tiles").is_some());
        assert_eq!(first["visible_entities"].as_array().map(Vec::len), Some(1));

        game.export_tick();
        let second = last_state(&mut game);
        assert!(second.get("visible_tiles").is_none());
        assert!(second.get("board_size").is_none());
    }

    #[test]
    fn removed_ids_are_sent_once() {
        let mut game = running();
        game.removed.push("gone".to_string());
        game.export_tick();
        assert_eq!(last_state(&mut game)["removed_entity_ids"], serde_json::json!(["gone"]));
        game.export_tick();
        assert_eq!(last_state(&mut game)["removed_entity_ids"], serde_json::json!([]));
    }

    #[test]
    fn full_state_carries_board_size() {
        let mut game = running();
        game.send_full_state("ann");
        let state = last_state(&mut game);
        assert_eq!(state["board_size"], serde_json::json!(9));
        assert_eq!(state["player_data"]["movement_cap"], serde_json::json!(10));
        assert_eq!(state["all_players"][0]["username"], serde_json::json!("ann"));
    }
}
