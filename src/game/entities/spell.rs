//! Ability entities spawned by played cards.

use std::iter;

use crate::config::entities::ABILITY_MOVEMENT_COOLDOWN;
use crate::game::cards::card::Card;
use crate::game::types::{DamageType, Point};

use super::{Entity, EntityKind, Enemy, Motion, Passive};

/// Turns and hit points per turn of a poison dart's effect.
const POISON_TURNS: u32 = 8;
const POISON_DAMAGE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellEffect {
    /// Hurts every hostile on its way.
    Pierce,
    /// Hurts the first hostile hit and vanishes.
    Dart,
    /// Like a dart, but leaves a poison passive instead of hitting hard.
    Poison,
    /// Stops at the first hostile and damages everything around when it
    /// resolves.
    Burst,
    /// Restores allies around it when it resolves.
    Heal,
}

#[derive(Debug)]
pub struct Spell {
    pub card: &'static str,
    pub caster: String,
    pub damage: i32,
    pub damage_type: DamageType,
    pub radius: i32,
    pub effect: SpellEffect,
}

impl Spell {
    /// Spell entity leaving `caster`: `range` steps forward, then waiting steps
    /// until the card's animation has played out.
    pub fn cast(card: &'static Card, caster: &Entity, damage: i32, effect: SpellEffect) -> Entity {
        let forward = caster.direction.to_point();
        let travel = card.range.max(0) as usize;
        let wait = card.animation_length.saturating_sub(travel);
        let steps = iter::repeat_n(forward, travel).chain(iter::repeat_n(Point::ZERO, wait));

        let spell = Spell {
            card: card.name,
            caster: caster.id.clone(),
            damage,
            damage_type: card.damage_type,
            radius: card.radius,
            effect,
        };
        Entity::new(uuid::Uuid::new_v4().to_string(), caster.position, EntityKind::Spell(spell))
            .with_direction(caster.direction)
            .with_motion(Motion::with_queue(ABILITY_MOVEMENT_COOLDOWN, steps))
            .passable()
    }

    /// Contact effect on a hostile this spell runs into.
    pub fn strike(&self, enemy: &mut Enemy) {
        match self.effect {
            SpellEffect::Pierce | SpellEffect::Dart => enemy.hp.sub(self.damage),
            SpellEffect::Poison => {
                enemy.hp.sub(self.damage);
                enemy
                    .passives
                    .push(Passive::new("poison", POISON_TURNS).with_regen(-POISON_DAMAGE, 0));
            }
            SpellEffect::Burst | SpellEffect::Heal => {}
        }
    }
}
