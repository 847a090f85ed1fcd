//! Card descriptors and the ability registry.
//!
//! Every card maps to a factory that turns a cast into its effect: either a new
//! spell entity on the board, or a change applied to the caster directly.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use serde::Serialize;

use crate::game::entities::passive::{Modifier, Passive};
use crate::game::entities::spell::{Spell, SpellEffect};
use crate::game::entities::Entity;
use crate::game::error::{GameError, GameResult};
use crate::game::grid::Grid;
use crate::game::types::{DamageType, Point};

/// Immutable description of an ability.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub name: &'static str,
    pub description: &'static str,
    /// Cells travelled by the spell, or reach of a self ability.
    pub range: i32,
    pub radius: i32,
    pub cost: i32,
    pub damage: i32,
    pub damage_type: DamageType,
    /// Steps the spell entity lives for, padded with waiting steps.
    pub animation_length: usize,
}

/// What a factory gets to work with when a card is played.
pub struct Cast<'a> {
    pub caster: &'a mut Entity,
    pub grid: &'a Grid,
    /// Cells holding an entity that blocks movement.
    pub occupied: &'a HashSet<Point>,
    /// Card damage after the caster's passives.
    pub damage: i32,
}

pub type AbilityFactory = fn(&'static Card, &mut Cast<'_>) -> Option<Entity>;

pub struct Ability {
    pub card: Card,
    pub factory: AbilityFactory,
}

impl Ability {
    pub fn cast(&'static self, cast: &mut Cast<'_>) -> Option<Entity> {
        (self.factory)(&self.card, cast)
    }
}

const fn card(
    name: &'static str,
    description: &'static str,
    (range, radius): (i32, i32),
    (cost, damage): (i32, i32),
    damage_type: DamageType,
    animation_length: usize,
) -> Card {
    Card { name, description, range, radius, cost, damage, damage_type, animation_length }
}

fn spell(card: &'static Card, cast: &mut Cast<'_>, effect: SpellEffect) -> Option<Entity> {
    Some(Spell::cast(card, cast.caster, cast.damage, effect))
}

fn pierce(card: &'static Card, cast: &mut Cast<'_>) -> Option<Entity> {
    spell(card, cast, SpellEffect::Pierce)
}

fn dart(card: &'static Card, cast: &mut Cast<'_>) -> Option<Entity> {
    spell(card, cast, SpellEffect::Dart)
}

fn poison_dart(card: &'static Card, cast: &mut Cast<'_>) -> Option<Entity> {
    spell(card, cast, SpellEffect::Poison)
}

fn burst(card: &'static Card, cast: &mut Cast<'_>) -> Option<Entity> {
    spell(card, cast, SpellEffect::Burst)
}

fn heal(card: &'static Card, cast: &mut Cast<'_>) -> Option<Entity> {
    spell(card, cast, SpellEffect::Heal)
}

fn anger(card: &'static Card, cast: &mut Cast<'_>) -> Option<Entity> {
    cast.caster.add_passive(Passive::new(card.name, 4).with_modifier(Modifier::Additive(3), None));
    None
}

fn sharpen(card: &'static Card, cast: &mut Cast<'_>) -> Option<Entity> {
    cast.caster.add_passive(
        Passive::new(card.name, 5).with_modifier(Modifier::Multiplicative(2.0), Some(DamageType::Piercing)),
    );
    None
}

const HASTE_BONUS: usize = 2;

fn haste(card: &'static Card, cast: &mut Cast<'_>) -> Option<Entity> {
    let player = cast.caster.as_player_mut()?;
    player.movement_cap += HASTE_BONUS;
    cast.caster.add_passive(Passive::new(card.name, 3).on_expire(|owner| {
        if let Some(player) = owner.as_player_mut() {
            player.movement_cap = player.movement_cap.saturating_sub(HASTE_BONUS);
        }
    }));
    None
}

fn teleport(card: &'static Card, cast: &mut Cast<'_>) -> Option<Entity> {
    let forward = cast.caster.direction.to_point();
    let mut landing = cast.caster.position;
    for distance in 1..=card.range {
        let candidate = cast.caster.position + forward * distance;
        if !cast.grid.is_walkable(candidate) {
            break;
        }
        if !cast.occupied.contains(&candidate) {
            landing = candidate;
        }
    }
    cast.caster.position = landing;
    None
}

fn build() -> HashMap<&'static str, Ability> {
    use DamageType::*;

    let abilities: [(Card, AbilityFactory); 11] = [
        (card("spear", "This spear will stab you!", (10, 0), (1, 1), Piercing, 10), pierce),
        (card("axe", "Me slash!", (5, 0), (4, 7), Piercing, 5), pierce),
        (card("magic dart", "A bolt of raw magic.", (4, 0), (1, 2), Magic, 4), dart),
        (card("magic missile", "Upgrade to magic dart.", (4, 0), (3, 7), Magic, 4), dart),
        (card("poison dart", "Deals 8 damage over time.", (20, 0), (1, 0), Piercing, 20), poison_dart),
        (card("fireball", "You know what this does.", (7, 3), (4, 3), Fire, 10), burst),
        (card("heal", "Restores allies around you.", (0, 2), (2, 4), Healing, 2), heal),
        (card("anger", "+3 damage for 4 turns.", (0, 0), (2, 0), Magic, 0), anger),
        (card("sharpen", "Doubles piercing damage for 5 turns.", (0, 0), (2, 0), Piercing, 0), sharpen),
        (card("haste", "Move 2 cells further for 3 turns.", (0, 0), (1, 0), Magic, 0), haste),
        (card("teleport", "Teleports self 3 spaces forward.", (3, 0), (1, 0), Magic, 0), teleport),
    ];

    abilities
        .into_iter()
        .map(|(card, factory)| (card.name, Ability { card, factory }))
        .collect()
}

pub fn registry() -> &'static HashMap<&'static str, Ability> {
    static REGISTRY: OnceLock<HashMap<&'static str, Ability>> = OnceLock::new();
    REGISTRY.get_or_init(build)
}

pub fn ability(name: &str) -> GameResult<&'static Ability> {
    registry()
        .get(name)
        .ok_or_else(|| GameError::invalid_action(format!("There is no card named '{name}'.")))
}

pub fn card_info(name: &str) -> Option<&'static Card> {
    registry().get(name).map(|a| &a.card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::game::CHEST_LOOT_TABLE;

    #[test]
    fn registry_knows_every_card() {
        for name in [
            "spear", "axe", "magic dart", "magic missile", "poison dart", "fireball", "heal", "anger", "sharpen",
            "haste", "teleport",
        ] {
            assert!(ability(name).is_ok(), "missing {name}");
        }
        assert_eq!(registry().len(), 11);
    }

    #[test]
    fn loot_table_only_names_registered_cards() {
        for (_, name) in CHEST_LOOT_TABLE {
            assert!(card_info(name).is_some(), "unknown loot {name}");
        }
    }

    #[test]
    fn unknown_card_is_an_invalid_action() {
        assert!(matches!(ability("boomerang"), Err(GameError::InvalidAction(_))));
    }
}
