//! Everything that lives on the board.
//!
//! Entities share one record ([`Entity`]) and carry their variant data in
//! [`EntityKind`]. Behaviour is split over three traits, looked up through the
//! variant tag: [`Movable`] for anything with a movement queue, [`Damageable`]
//! for players and hostiles, [`Interactable`] for props a player can bump into.

pub mod animation;
pub mod enemy;
pub mod movement;
pub mod neutral;
pub mod passive;
pub mod player;
pub mod spawner;
pub mod spell;
pub mod stat;

use serde::Serialize;

use crate::game::types::{Direction, Phase, Point};

pub use animation::{Animation, AnimationState};
pub use enemy::{Enemy, EnemyKind};
pub use movement::Motion;
pub use neutral::{Chest, Door, DoorState, Key};
pub use passive::Passive;
pub use player::Player;
pub use spawner::Spawner;
pub use spell::{Spell, SpellEffect};
pub use stat::Stat;

pub type EntityId = String;

#[derive(Debug)]
pub enum EntityKind {
    Player(Box<Player>),
    Enemy(Enemy),
    Spell(Spell),
    Spawner(Spawner),
    Door(Door),
    Key(Key),
    Chest(Chest),
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Player(_) => "player",
            EntityKind::Enemy(_) => "enemy",
            EntityKind::Spell(_) => "spell",
            EntityKind::Spawner(_) => "spawner",
            EntityKind::Door(_) => "door",
            EntityKind::Key(_) => "key",
            EntityKind::Chest(_) => "chest",
        }
    }
}

#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    pub position: Point,
    pub direction: Direction,
    pub alive: bool,
    pub can_move_through: bool,
    pub animation: Animation,
    /// Present on movable entities only.
    pub motion: Option<Motion>,
    pub kind: EntityKind,
}

/// Outcome of a player bumping into a prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub passable: bool,
    /// The prop is used up and leaves the board.
    pub consumed: bool,
}

impl Contact {
    pub const BLOCKED: Contact = Contact { passable: false, consumed: false };
    pub const PASS: Contact = Contact { passable: true, consumed: false };
}

pub trait Movable {
    fn motion(&self) -> Option<&Motion>;
    fn motion_mut(&mut self) -> Option<&mut Motion>;

    /// Stationary entities are always settled.
    fn settled(&self) -> bool {
        self.motion().is_none_or(Motion::settled)
    }
}

pub trait Damageable {
    fn health(&self) -> &Stat;
    fn health_mut(&mut self) -> &mut Stat;

    fn mana_mut(&mut self) -> Option<&mut Stat> {
        None
    }

    fn passives(&self) -> &[Passive];
    fn passives_mut(&mut self) -> &mut Vec<Passive>;
}

pub trait Interactable {
    /// A player walked into this prop.
    fn interact(&mut self, own_id: &str, player: &mut Player) -> Contact;
}

impl Movable for Entity {
    fn motion(&self) -> Option<&Motion> {
        self.motion.as_ref()
    }

    fn motion_mut(&mut self) -> Option<&mut Motion> {
        self.motion.as_mut()
    }
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, position: Point, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            position,
            direction: Direction::Down,
            alive: true,
            can_move_through: false,
            animation: Animation::default(),
            motion: None,
            kind,
        }
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = Some(motion);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn passable(mut self) -> Self {
        self.can_move_through = true;
        self
    }

    /// Phase in which this entity resolves its movement and actions.
    pub fn phase(&self) -> Option<Phase> {
        match self.kind {
            EntityKind::Player(_) => Some(Phase::Player),
            EntityKind::Spell(_) => Some(Phase::AllyEntity),
            EntityKind::Enemy(_) => Some(Phase::Enemy),
            EntityKind::Spawner(_) => Some(Phase::EnemyEntity),
            EntityKind::Door(_) | EntityKind::Key(_) | EntityKind::Chest(_) => None,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy(_))
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.kind {
            EntityKind::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.kind {
            EntityKind::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn damageable(&self) -> Option<&dyn Damageable> {
        match &self.kind {
            EntityKind::Player(player) => Some(player.as_ref()),
            EntityKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        match &mut self.kind {
            EntityKind::Player(player) => Some(player.as_mut()),
            EntityKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn passives(&self) -> Option<&[Passive]> {
        self.damageable().map(|d| d.passives())
    }

    pub fn passives_mut(&mut self) -> Option<&mut Vec<Passive>> {
        self.damageable_mut().map(|d| d.passives_mut())
    }

    pub fn add_passive(&mut self, passive: Passive) {
        if let Some(list) = self.passives_mut() {
            list.push(passive);
        }
    }

    /// Whether anything is queued or a step is still in progress.
    pub fn busy(&self) -> bool {
        !self.settled()
    }

    pub fn die(&mut self) {
        self.alive = false;
        if let Some(motion) = self.motion.as_mut() {
            motion.stop();
        }
    }

    /// Kill the entity once its hit points run out.
    pub fn check_health(&mut self) {
        let drained = self.damageable().is_some_and(|d| d.health().is_empty());
        if drained && self.alive {
            self.die();
        }
    }

    /// Position as displayed, trailing behind while a step is animating.
    pub fn display_position(&self) -> (f32, f32) {
        let (x, y) = (self.position.x as f32, self.position.y as f32);
        match &self.motion {
            Some(motion) => {
                let lag = motion.lag();
                (x - motion.last_step.x as f32 * lag, y - motion.last_step.y as f32 * lag)
            }
            None => (x, y),
        }
    }

    /// React to `other` sharing a cell with this entity. Effects land on `self`,
    /// except for props which hand their contents over to the player. Returns
    /// whether `other` may be moved through as far as `self` is concerned.
    pub fn collide(&mut self, other: &mut Entity) -> bool {
        match &mut self.kind {
            EntityKind::Player(player) => {
                if let EntityKind::Enemy(enemy) = &other.kind {
                    player.hp.sub(enemy.damage);
                }
            }
            EntityKind::Enemy(enemy) => {
                if let EntityKind::Spell(spell) = &other.kind {
                    spell.strike(enemy);
                }
            }
            EntityKind::Spell(spell) => {
                let effect = spell.effect;
                if other.is_enemy() {
                    match effect {
                        SpellEffect::Dart | SpellEffect::Poison => self.die(),
                        SpellEffect::Burst => {
                            if let Some(motion) = self.motion.as_mut() {
                                motion.queue.clear();
                            }
                        }
                        SpellEffect::Pierce | SpellEffect::Heal => {}
                    }
                }
                return true;
            }
            EntityKind::Door(_) | EntityKind::Key(_) | EntityKind::Chest(_) => {
                let EntityKind::Player(player) = &mut other.kind else {
                    return self.can_move_through;
                };
                let contact = match &mut self.kind {
                    EntityKind::Door(door) => door.interact(&self.id, player),
                    EntityKind::Key(key) => key.interact(&self.id, player),
                    EntityKind::Chest(chest) => chest.interact(&self.id, player),
                    _ => Contact::BLOCKED,
                };
                if contact.consumed {
                    self.die();
                }
                return contact.passable;
            }
            EntityKind::Spawner(_) => {}
        }

        self.check_health();
        other.can_move_through
    }
}

/// Public, per-tick view of a non-player entity.
#[derive(Debug, Serialize)]
pub struct EntityView<'a> {
    pub id: &'a str,
    pub kind: &'static str,
    pub sprite: String,
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub animation: &'a Animation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<Stat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'static str>,
}

impl Entity {
    pub fn view(&self) -> EntityView<'_> {
        let (x, y) = self.display_position();
        let (sprite, state) = match &self.kind {
            EntityKind::Player(player) => (player.color.clone(), None),
            EntityKind::Enemy(enemy) => (enemy.kind.name().to_string(), None),
            EntityKind::Spell(spell) => (spell.card.replace(' ', ""), None),
            EntityKind::Spawner(spawner) => (format!("{}_spawner", spawner.spawns.name()), None),
            EntityKind::Door(door) => (door.sprite().to_string(), Some(door.state.name())),
            EntityKind::Key(_) => ("key".to_string(), None),
            EntityKind::Chest(chest) => ("chest".to_string(), Some(chest.state_name())),
        };
        EntityView {
            id: &self.id,
            kind: self.kind.name(),
            sprite,
            x,
            y,
            direction: self.direction,
            animation: &self.animation,
            hp: self.damageable().map(|d| *d.health()),
            state,
        }
    }
}

/// Two distinct elements of a slice, both mutably.
pub fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "pair_mut needs two distinct indices");
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cards::card::card_info;
    use crate::game::cards::deck::Deck;
    use crate::game::grid::generator::DoorSite;
    use crate::game::grid::Item;
    use crate::game::types::Orientation;

    fn player() -> Entity {
        Player::spawn("ann", "blue", Deck::default())
    }

    fn spell(effect: SpellEffect) -> Entity {
        let caster = player();
        let card = card_info("magic dart").expect("registered");
        Spell::cast(card, &caster, 3, effect)
    }

    #[test]
    fn hostile_contact_hurts_the_player() {
        let mut ann = player();
        let mut slime = Enemy::spawn(EnemyKind::Slime, Point::new(0, 1));
        let before = ann.as_player().map(|p| p.hp.value).unwrap_or_default();

        assert!(!ann.collide(&mut slime));
        assert!(!slime.collide(&mut ann));

        let after = ann.as_player().map(|p| p.hp.value).unwrap_or_default();
        assert_eq!(before - after, EnemyKind::Slime.stats().damage);
    }

    #[test]
    fn darts_die_on_hostiles_and_hurt_them() {
        let mut dart = spell(SpellEffect::Dart);
        let mut sloth = Enemy::spawn(EnemyKind::Sloth, Point::new(0, 1));
        let before = sloth.damageable().map(|d| d.health().value).unwrap_or_default();

        assert!(dart.collide(&mut sloth));
        assert!(sloth.collide(&mut dart));
        assert!(!dart.alive);
        let after = sloth.damageable().map(|d| d.health().value).unwrap_or_default();
        assert_eq!(before - after, 3);
    }

    #[test]
    fn poison_dart_leaves_a_passive() {
        let mut dart = spell(SpellEffect::Poison);
        let mut sloth = Enemy::spawn(EnemyKind::Sloth, Point::new(0, 1));
        sloth.collide(&mut dart);
        assert_eq!(sloth.passives().map(<[Passive]>::len), Some(1));
    }

    #[test]
    fn key_is_picked_up_and_opens_its_door() {
        let mut ann = player();
        let mut door = Door::place(&DoorSite { position: Point::new(3, 3), orientation: Orientation::Vertical });
        let mut key = Key::place(door.id.clone(), Point::new(1, 1));

        assert!(!door.collide(&mut ann));
        assert!(matches!(&door.kind, EntityKind::Door(d) if d.state == DoorState::Locked));

        assert!(key.collide(&mut ann));
        assert!(!key.alive);
        let holds = ann.as_player().is_some_and(|p| p.inventory.contains(&Item::Key { door_id: door.id.clone() }));
        assert!(holds);

        assert!(!door.collide(&mut ann));
        assert!(matches!(&door.kind, EntityKind::Door(d) if matches!(d.state, DoorState::Opening(_))));
    }

    #[test]
    fn chest_loot_goes_to_hand_once() {
        let mut ann = player();
        let mut chest = Chest::place(Point::new(2, 2), Some("fireball".to_string()));
        assert!(!chest.collide(&mut ann));
        assert!(!chest.collide(&mut ann));
        let hand = ann.as_player().map(|p| p.deck.hand.clone()).unwrap_or_default();
        assert_eq!(hand, vec!["fireball".to_string()]);
    }

    #[test]
    fn pair_mut_returns_both_in_order() {
        let mut values = [1, 2, 3];
        let (a, b) = pair_mut(&mut values, 2, 0);
        std::mem::swap(a, b);
        assert_eq!(values, [3, 2, 1]);
    }
}
