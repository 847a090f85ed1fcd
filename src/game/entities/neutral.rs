//! Props: doors, their keys and chests.

use crate::config::entities::DOOR_OPENING_TICKS;
use crate::game::grid::Item;
use crate::game::grid::generator::DoorSite;
use crate::game::types::{Orientation, Point};

use super::{Contact, Entity, EntityKind, Interactable, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Locked,
    /// Ticks left in the opening animation.
    Opening(u32),
    Open,
}

impl DoorState {
    pub fn name(self) -> &'static str {
        match self {
            DoorState::Locked => "locked",
            DoorState::Opening(_) => "opening",
            DoorState::Open => "open",
        }
    }
}

#[derive(Debug)]
pub struct Door {
    pub orientation: Orientation,
    pub state: DoorState,
}

impl Door {
    pub fn place(site: &DoorSite) -> Entity {
        let door = Door { orientation: site.orientation, state: DoorState::Locked };
        Entity::new(uuid::Uuid::new_v4().to_string(), site.position, EntityKind::Door(door))
    }

    pub fn sprite(&self) -> &'static str {
        match self.orientation {
            Orientation::Vertical => "door_v",
            Orientation::Horizontal => "door_h",
        }
    }

    /// Advance the opening animation. Returns true on the tick the door
    /// becomes passable.
    pub fn tick(&mut self) -> bool {
        match self.state {
            DoorState::Opening(0) | DoorState::Opening(1) => {
                self.state = DoorState::Open;
                true
            }
            DoorState::Opening(left) => {
                self.state = DoorState::Opening(left - 1);
                false
            }
            DoorState::Locked | DoorState::Open => false,
        }
    }
}

impl Interactable for Door {
    fn interact(&mut self, own_id: &str, player: &mut Player) -> Contact {
        match self.state {
            DoorState::Locked if player.holds_key(own_id) => {
                self.state = DoorState::Opening(DOOR_OPENING_TICKS);
                Contact::BLOCKED
            }
            DoorState::Open => Contact::PASS,
            DoorState::Locked | DoorState::Opening(_) => Contact::BLOCKED,
        }
    }
}

#[derive(Debug)]
pub struct Key {
    pub door_id: String,
}

impl Key {
    pub fn place(door_id: String, position: Point) -> Entity {
        Entity::new(uuid::Uuid::new_v4().to_string(), position, EntityKind::Key(Key { door_id })).passable()
    }
}

impl Interactable for Key {
    fn interact(&mut self, _own_id: &str, player: &mut Player) -> Contact {
        player.inventory.push(Item::Key { door_id: self.door_id.clone() });
        Contact { passable: true, consumed: true }
    }
}

#[derive(Debug)]
pub struct Chest {
    pub loot: Option<String>,
    pub opened: bool,
}

impl Chest {
    pub fn place(position: Point, loot: Option<String>) -> Entity {
        Entity::new(uuid::Uuid::new_v4().to_string(), position, EntityKind::Chest(Chest { loot, opened: false }))
    }

    pub fn state_name(&self) -> &'static str {
        if self.opened { "open" } else { "closed" }
    }
}

impl Interactable for Chest {
    fn interact(&mut self, _own_id: &str, player: &mut Player) -> Contact {
        if !self.opened {
            self.opened = true;
            if let Some(card) = self.loot.take() {
                player.deck.hand.push(card);
            }
        }
        Contact::BLOCKED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_opens_after_its_animation() {
        let mut door = Door { orientation: Orientation::Horizontal, state: DoorState::Opening(3) };
        assert!(!door.tick());
        assert!(!door.tick());
        assert!(door.tick());
        assert_eq!(door.state, DoorState::Open);
        assert!(!door.tick());
    }
}
