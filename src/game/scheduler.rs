//! Four-phase turn scheduler, advanced one tick at a time.
//!
//! Every tick runs the per-frame bookkeeping of all live entities, then tries
//! to resolve the phase selected by `turn % 4`. A phase resolves once none of
//! its entities has movement left; its end hooks then run and the turn
//! counter advances.

use std::collections::HashSet;

use log::{debug, info};
use serde_json::json;

use crate::config::entities::PLAYER_MANA_REGEN;
use crate::config::game::MAX_ENEMIES;
use crate::game::algorithms::pathfinding::find_path;
use crate::game::broadcast::Target;
use crate::game::cards::card::{Cast, ability};
use crate::game::entities::passive::{decay_passives, modified_damage};
use crate::game::entities::{Enemy, EntityId, EntityKind, Motion, Spawner, SpellEffect, pair_mut};
use crate::game::error::{GameError, GameResult};
use crate::game::grid::Item;
use crate::game::state::Game;
use crate::game::types::{Direction, Phase, PlayerState, Point};

impl Game {
    /// One simulation step. Does nothing unless the game is running.
    pub fn tick(&mut self) {
        if !self.is_running() {
            return;
        }

        self.frame_tick();

        let phase = Phase::from_turn(self.turn);
        if phase == Phase::Player && !self.gate_players() {
            self.export_tick();
            return;
        }

        self.run_movement(phase);
        self.refresh_all_sight();
        self.sweep();

        if self.phase_busy(phase) {
            self.export_tick();
            return;
        }

        self.end_phase(phase);
        self.sweep();
        self.turn += 1;
        self.pre_phase(Phase::from_turn(self.turn));
        self.export_tick();
    }

    fn frame_tick(&mut self) {
        for entity in self.entities.iter_mut().filter(|e| e.alive) {
            let moving = entity.busy();
            if let Some(motion) = entity.motion.as_mut() {
                motion.tick();
            }
            entity.animation.update(moving);
            if let EntityKind::Door(door) = &mut entity.kind {
                if door.tick() {
                    entity.can_move_through = true;
                    self.visibility_dirty = true;
                }
            }
        }
    }

    /// Hold the player phase until no living player is still planning. Once
    /// released, ready players hand their plan over to their movement queue.
    fn gate_players(&mut self) -> bool {
        let planning = self
            .entities
            .iter()
            .filter(|e| e.alive)
            .filter_map(|e| e.as_player())
            .any(|p| p.state == PlayerState::NotReady);
        if planning {
            return false;
        }

        for entity in self.entities.iter_mut().filter(|e| e.alive) {
            let EntityKind::Player(player) = &mut entity.kind else {
                continue;
            };
            if player.state != PlayerState::Ready {
                continue;
            }
            player.state = PlayerState::Processing;
            if let Some(motion) = entity.motion.as_mut() {
                motion.queue.extend(player.planned.drain(..));
            }
        }
        true
    }

    fn in_phase(&self, index: usize, phase: Phase) -> bool {
        let entity = &self.entities[index];
        entity.alive && entity.phase() == Some(phase)
    }

    fn phase_busy(&self, phase: Phase) -> bool {
        (0..self.entities.len()).any(|i| self.in_phase(i, phase) && self.entities[i].busy())
    }

    fn run_movement(&mut self, phase: Phase) {
        for index in 0..self.entities.len() {
            if !self.in_phase(index, phase) || !self.entities[index].motion.as_ref().is_some_and(Motion::ready) {
                continue;
            }
            let Err(e) = self.movement_action(index) else {
                continue;
            };

            let entity = &mut self.entities[index];
            debug!("[Game {}] {} {} forfeits its move: {}", self.room_id, entity.kind.name(), entity.id, e);
            match entity.kind {
                EntityKind::Player(_) => {
                    let username = entity.id.clone();
                    self.notify(&username, &e);
                }
                EntityKind::Spell(_) => entity.die(),
                _ => {}
            }
        }
    }

    /// Take the next queued step of entity `index`, resolving collisions with
    /// everything at the destination. The step commits only if every
    /// collision on both sides lets it through.
    pub(crate) fn movement_action(&mut self, index: usize) -> GameResult<()> {
        let entity = &mut self.entities[index];
        let Some(motion) = entity.motion.as_mut() else {
            return Ok(());
        };
        let Some(step) = motion.queue.pop_front() else {
            return Ok(());
        };
        if step == Point::ZERO {
            motion.commit(step);
            return Ok(());
        }
        if let Some(direction) = Direction::from_move(step) {
            entity.direction = direction;
        }

        let target = entity.position + step;
        if !self.grid.in_bounds(target) {
            return Err(GameError::invalid_action("You cannot leave the board."));
        }
        if !self.grid.is_walkable(target) {
            return Err(GameError::invalid_action("You cannot move there."));
        }

        let occupants: Vec<usize> = self
            .entities
            .iter()
            .enumerate()
            .filter(|(j, e)| *j != index && e.alive && e.position == target)
            .map(|(j, _)| j)
            .collect();

        let mut passable = true;
        for j in occupants {
            let (mover, occupant) = pair_mut(&mut self.entities, index, j);
            if !mover.alive || !occupant.alive {
                continue;
            }
            let forward = mover.collide(occupant);
            let backward = occupant.collide(mover);
            passable &= forward && backward;
        }

        let mover = &mut self.entities[index];
        if !passable || !mover.alive {
            return Ok(());
        }
        mover.position = target;
        if let Some(motion) = mover.motion.as_mut() {
            motion.commit(step);
        }

        match &mut mover.kind {
            EntityKind::Player(player) => {
                if player.held.is_none() {
                    if let Some(tile) = self.grid.get_mut(target) {
                        if tile.item.as_ref().is_some_and(Item::collectable) {
                            player.held = tile.item.take();
                            self.visibility_dirty = true;
                        }
                    }
                }
            }
            // Players re-export through their own sight refresh.
            _ => self.visibility_dirty = true,
        }
        Ok(())
    }

    /// Announce dead players and drop what they carried; remove every other
    /// dead entity from the board.
    fn sweep(&mut self) {
        let mut deaths = Vec::new();
        for entity in self.entities.iter_mut().filter(|e| !e.alive) {
            let position = entity.position;
            let Some(player) = entity.as_player_mut() else {
                continue;
            };
            if player.death_handled {
                continue;
            }
            player.death_handled = true;
            player.planned.clear();
            player.selected = None;
            deaths.push((player.username.clone(), position, player.held.take()));
        }

        for (username, position, held) in deaths {
            if let (Some(item), Some(tile)) = (held, self.grid.get_mut(position)) {
                if !tile.item.as_ref().is_some_and(Item::collectable) {
                    tile.item = Some(item);
                }
            }
            info!("[Game {}] {} died on turn {}", self.room_id, username, self.turn);
            self.emit("message", json!(format!("{username} died")), Target::Room);
            self.visibility_dirty = true;
        }

        let gone: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|e| !e.alive && !e.is_player())
            .map(|e| e.id.clone())
            .collect();
        if gone.is_empty() {
            return;
        }
        self.entities.retain(|e| e.alive || e.is_player());
        self.removed.extend(gone);
        self.visibility_dirty = true;
    }

    fn end_phase(&mut self, phase: Phase) {
        match phase {
            Phase::Player => {
                for index in 0..self.entities.len() {
                    if !self.in_phase(index, phase) {
                        continue;
                    }
                    let before = self.entities[index].passives().map_or(0, <[_]>::len);
                    if let Err(e) = self.cast_selected(index) {
                        let username = self.entities[index].id.clone();
                        self.notify(&username, &e);
                    }
                    let entity = &mut self.entities[index];
                    if let Some(player) = entity.as_player_mut() {
                        player.mana.add(PLAYER_MANA_REGEN);
                        player.state = PlayerState::NotReady;
                    }
                    // Passives cast this phase start counting on the owner's next turn.
                    let fresh = entity
                        .passives_mut()
                        .map(|list| list.split_off(before.min(list.len())))
                        .unwrap_or_default();
                    decay_passives(entity);
                    if let Some(list) = entity.passives_mut() {
                        list.extend(fresh);
                    }
                }
            }
            Phase::AllyEntity => self.resolve_spells(),
            Phase::Enemy => {
                for entity in self.entities.iter_mut().filter(|e| e.alive && e.is_enemy()) {
                    decay_passives(entity);
                }
            }
            Phase::EnemyEntity => self.run_spawners(),
        }
    }

    /// Play the hand slot the player selected during planning.
    fn cast_selected(&mut self, index: usize) -> GameResult<()> {
        let occupied = self.occupied();
        let Game { entities, grid, rng, .. } = self;
        let entity = &mut entities[index];
        let Some(player) = entity.as_player_mut() else {
            return Ok(());
        };
        let Some(slot) = player.selected.take() else {
            return Ok(());
        };
        let name = player
            .deck
            .hand
            .get(slot)
            .cloned()
            .ok_or_else(|| GameError::invalid_action("There is no card in that slot."))?;
        let ability = ability(&name)?;
        if player.mana.value < ability.card.cost {
            return Err(GameError::invalid_action("You do not have enough mana for that card."));
        }
        player.deck.play(slot, rng)?;
        player.mana.sub(ability.card.cost);
        let damage = modified_damage(ability.card.damage, ability.card.damage_type, &player.passives);

        let spawned = ability.cast(&mut Cast { caster: entity, grid, occupied: &occupied, damage });
        if let Some(spawned) = spawned {
            entities.push(spawned);
        }
        Ok(())
    }

    /// Area effects of the spells that finished travelling, then the spells
    /// themselves go.
    fn resolve_spells(&mut self) {
        let bursts: Vec<(Point, SpellEffect, i32, i32)> = self
            .entities
            .iter()
            .filter(|e| e.alive)
            .filter_map(|e| match &e.kind {
                EntityKind::Spell(spell) => Some((e.position, spell.effect, spell.damage, spell.radius)),
                _ => None,
            })
            .collect();

        for (center, effect, amount, radius) in bursts {
            for target in self.entities.iter_mut() {
                if !target.alive || target.position.manhattan_distance(center) > radius {
                    continue;
                }
                match effect {
                    SpellEffect::Burst => {
                        if let Some(damageable) = target.damageable_mut() {
                            damageable.health_mut().sub(amount);
                        }
                        target.check_health();
                    }
                    SpellEffect::Heal => {
                        if let Some(player) = target.as_player_mut() {
                            player.hp.add(amount);
                        }
                    }
                    SpellEffect::Pierce | SpellEffect::Dart | SpellEffect::Poison => {}
                }
            }
        }

        for entity in self.entities.iter_mut() {
            if matches!(entity.kind, EntityKind::Spell(_)) {
                entity.die();
            }
        }
    }

    fn run_spawners(&mut self) {
        let mut hostiles = self.entities.iter().filter(|e| e.alive && e.is_enemy()).count();
        let spawners: Vec<_> = self
            .entities
            .iter()
            .filter(|e| e.alive)
            .filter_map(|e| match &e.kind {
                EntityKind::Spawner(spawner) => Some((e.position, spawner.spawns)),
                _ => None,
            })
            .collect();

        let mut occupied: HashSet<Point> = self.occupied();
        for (origin, kind) in spawners {
            if hostiles >= MAX_ENEMIES {
                break;
            }
            let Some(site) = Spawner::spawn_site(origin, &self.grid, &occupied, &mut self.rng) else {
                continue;
            };
            occupied.insert(site);
            self.entities.push(Enemy::spawn(kind, site));
            hostiles += 1;
            debug!("[Game {}] {} spawned at {:?}", self.room_id, kind.name(), site);
        }
    }

    /// Hooks run when a phase becomes active.
    fn pre_phase(&mut self, phase: Phase) {
        if phase != Phase::Enemy {
            return;
        }
        let targets: Vec<Point> = self
            .entities
            .iter()
            .filter(|e| e.alive && e.is_player())
            .map(|e| e.position)
            .collect();

        for entity in self.entities.iter_mut().filter(|e| e.alive) {
            let EntityKind::Enemy(enemy) = &entity.kind else {
                continue;
            };
            let cap = enemy.path_cap;
            let from = entity.position;
            let Some(goal) = targets.iter().copied().min_by_key(|p| p.manhattan_distance(from)) else {
                continue;
            };
            let path = find_path(&self.grid, from, goal, cap);
            if let Some(motion) = entity.motion.as_mut() {
                motion.queue = path.into();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::entities::{PLAYER_MAX_HP, PLAYER_MOVEMENT_COOLDOWN};
    use crate::game::cards::card::card_info;
    use crate::game::cards::deck::Deck;
    use crate::game::entities::{EnemyKind, Entity, Player, Spell};
    use crate::game::grid::{Grid, Tile};
    use crate::game::types::GamePhase;
    use crate::storage::StoredDeck;

    /// A running game on an open 9x9 floor, walled at the border.
    fn arena() -> Game {
        let mut game = Game::with_rng("arena", Some("ann".into()), 9, StdRng::seed_from_u64(3));
        let mut grid = Grid::new(9, Tile::floor());
        for p in grid.points() {
            if p.x == 0 || p.y == 0 || p.x == 8 || p.y == 8 {
                grid.set(p, Tile::wall("wall"));
            }
        }
        game.grid = grid;
        game.phase = GamePhase::Started;
        game
    }

    fn add_player(game: &mut Game, name: &str, at: Point) -> usize {
        let mut entity = Player::spawn(name, "blue", Deck::from_stored(&StoredDeck::starter()));
        entity.position = at;
        if let Some(player) = entity.as_player_mut() {
            player.start(&mut StdRng::seed_from_u64(9));
        }
        game.entities.push(entity);
        game.entities.len() - 1
    }

    fn queue(entity: &mut Entity, steps: &[Point]) {
        if let Some(motion) = entity.motion.as_mut() {
            motion.queue.extend(steps.iter().copied());
        }
    }

    #[test]
    fn walls_reject_the_step() {
        let mut game = arena();
        let ann = add_player(&mut game, "ann", Point::new(1, 1));
        queue(&mut game.entities[ann], &[Point::new(-1, 0)]);
        assert!(matches!(game.movement_action(ann), Err(GameError::InvalidAction(_))));
        assert_eq!(game.entities[ann].position, Point::new(1, 1));
        assert_eq!(game.entities[ann].direction, Direction::Left);
    }

    #[test]
    fn committed_step_resets_the_timer() {
        let mut game = arena();
        let ann = add_player(&mut game, "ann", Point::new(2, 2));
        queue(&mut game.entities[ann], &[Point::new(1, 0)]);
        game.movement_action(ann).unwrap();
        let entity = &game.entities[ann];
        assert_eq!(entity.position, Point::new(3, 2));
        assert_eq!(entity.motion.as_ref().map(|m| m.timer), Some(PLAYER_MOVEMENT_COOLDOWN));
    }

    #[test]
    fn hostiles_block_and_hurt() {
        let mut game = arena();
        let ann = add_player(&mut game, "ann", Point::new(2, 2));
        game.entities.push(Enemy::spawn(EnemyKind::Sloth, Point::new(3, 2)));
        queue(&mut game.entities[ann], &[Point::new(1, 0)]);
        game.movement_action(ann).unwrap();

        let player = game.entities[ann].as_player().map(|p| p.hp.value).unwrap_or_default();
        assert_eq!(game.entities[ann].position, Point::new(2, 2));
        assert!(player < PLAYER_MAX_HP);
    }

    #[test]
    fn collector_is_picked_up() {
        let mut game = arena();
        let ann = add_player(&mut game, "ann", Point::new(2, 2));
        if let Some(tile) = game.grid.get_mut(Point::new(2, 3)) {
            tile.item = Some(Item::Collector { color: "blue".into() });
        }
        queue(&mut game.entities[ann], &[Point::new(0, 1)]);
        game.movement_action(ann).unwrap();

        let held = game.entities[ann].as_player().and_then(|p| p.held.clone());
        assert_eq!(held, Some(Item::Collector { color: "blue".into() }));
        assert!(game.grid.get(Point::new(2, 3)).is_some_and(|t| t.item.is_none()));
    }

    #[test]
    fn hostiles_path_toward_the_nearest_player() {
        let mut game = arena();
        add_player(&mut game, "ann", Point::new(1, 1));
        add_player(&mut game, "bob", Point::new(7, 7));
        game.entities.push(Enemy::spawn(EnemyKind::MonkeyBall, Point::new(6, 6)));
        game.pre_phase(Phase::Enemy);

        let motion = game.entities.iter().find(|e| e.is_enemy()).and_then(|e| e.motion.as_ref());
        assert_eq!(motion.map(|m| m.queue.len()), Some(2));
    }

    #[test]
    fn dead_players_drop_what_they_hold() {
        let mut game = arena();
        let ann = add_player(&mut game, "ann", Point::new(4, 4));
        if let Some(player) = game.entities[ann].as_player_mut() {
            player.held = Some(Item::Collector { color: "blue".into() });
        }
        game.entities[ann].die();
        game.sweep();
        game.sweep();

        let dropped = game.grid.get(Point::new(4, 4)).and_then(|t| t.item.clone());
        assert_eq!(dropped, Some(Item::Collector { color: "blue".into() }));
        assert_eq!(game.drain_outbox().iter().filter(|o| o.event == "message").count(), 1);
        assert_eq!(game.entities.len(), 1);
    }

    #[test]
    fn fireball_burst_hits_everything_in_radius() {
        let mut game = arena();
        add_player(&mut game, "ann", Point::new(1, 1));
        game.entities.push(Enemy::spawn(EnemyKind::Slime, Point::new(5, 5)));
        game.entities.push(Enemy::spawn(EnemyKind::Slime, Point::new(1, 7)));

        let card = card_info("fireball").expect("registered");
        let mut spell = Spell::cast(card, &game.entities[0], 10, SpellEffect::Burst);
        spell.position = Point::new(5, 6);
        if let Some(motion) = spell.motion.as_mut() {
            motion.stop();
        }
        game.entities.push(spell);

        game.resolve_spells();
        game.sweep();
        let hostiles: Vec<Point> = game.entities.iter().filter(|e| e.is_enemy()).map(|e| e.position).collect();
        assert_eq!(hostiles, vec![Point::new(1, 7)]);
        assert_eq!(game.removed.len(), 2);
    }
}
