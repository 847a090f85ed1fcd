//! Timed effects attached to players and hostiles.

use std::fmt;

use serde::Serialize;

use crate::game::types::DamageType;

use super::Entity;

/// Called with the owning entity when a passive runs out.
pub type ExpiryCallback = Box<dyn FnOnce(&mut Entity) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Modifier {
    Additive(i32),
    Multiplicative(f32),
}

/// Changes outgoing damage, optionally for a single damage type only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamageModifier {
    pub modifier: Modifier,
    pub damage_type: Option<DamageType>,
}

impl DamageModifier {
    fn applies_to(&self, damage_type: DamageType) -> bool {
        self.damage_type.is_none_or(|t| t == damage_type)
    }
}

/// Stat changes applied every time the passive ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Regen {
    pub hp: i32,
    pub mana: i32,
}

#[derive(Serialize)]
pub struct Passive {
    pub name: String,
    /// Owner turns left before expiry.
    pub turns: u32,
    pub regen: Regen,
    pub modifiers: Vec<DamageModifier>,
    #[serde(skip)]
    pub on_expire: Option<ExpiryCallback>,
}

impl fmt::Debug for Passive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Passive")
            .field("name", &self.name)
            .field("turns", &self.turns)
            .field("regen", &self.regen)
            .field("modifiers", &self.modifiers)
            .field("on_expire", &self.on_expire.is_some())
            .finish()
    }
}

impl Passive {
    pub fn new(name: impl Into<String>, turns: u32) -> Self {
        Self {
            name: name.into(),
            turns,
            regen: Regen::default(),
            modifiers: Vec::new(),
            on_expire: None,
        }
    }

    pub fn with_regen(mut self, hp: i32, mana: i32) -> Self {
        self.regen = Regen { hp, mana };
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier, damage_type: Option<DamageType>) -> Self {
        self.modifiers.push(DamageModifier { modifier, damage_type });
        self
    }

    pub fn on_expire(mut self, callback: impl FnOnce(&mut Entity) + Send + 'static) -> Self {
        self.on_expire = Some(Box::new(callback));
        self
    }
}

/// Outgoing damage after every matching modifier: additive ones first, then
/// multiplicative ones.
pub fn modified_damage(base: i32, damage_type: DamageType, passives: &[Passive]) -> i32 {
    let modifiers: Vec<&DamageModifier> = passives
        .iter()
        .flat_map(|p| p.modifiers.iter())
        .filter(|m| m.applies_to(damage_type))
        .collect();

    let mut damage = base;
    for m in &modifiers {
        if let Modifier::Additive(amount) = m.modifier {
            damage += amount;
        }
    }
    let mut damage = damage as f32;
    for m in &modifiers {
        if let Modifier::Multiplicative(factor) = m.modifier {
            damage *= factor;
        }
    }
    (damage.round() as i32).max(0)
}

/// Run one owner turn of every passive on `entity`.
///
/// Each passive applies its regen and counts down; one that reaches zero fires
/// its callback and is gone from the list when this returns.
pub fn decay_passives(entity: &mut Entity) {
    let Some(list) = entity.passives_mut() else {
        return;
    };
    let passives = std::mem::take(list);

    let mut kept = Vec::with_capacity(passives.len());
    let mut expired = Vec::new();
    for mut passive in passives {
        if let Some(target) = entity.damageable_mut() {
            target.health_mut().add(passive.regen.hp);
            if let Some(mana) = target.mana_mut() {
                mana.add(passive.regen.mana);
            }
        }
        passive.turns = passive.turns.saturating_sub(1);
        if passive.turns == 0 {
            expired.push(passive);
        } else {
            kept.push(passive);
        }
    }

    // Callbacks may add passives of their own.
    for mut passive in expired {
        if let Some(callback) = passive.on_expire.take() {
            callback(entity);
        }
    }
    if let Some(list) = entity.passives_mut() {
        kept.append(list);
        *list = kept;
    }
    entity.check_health();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::game::entities::enemy::{Enemy, EnemyKind};
    use crate::game::types::Point;

    #[test]
    fn additive_runs_before_multiplicative() {
        let passives = vec![
            Passive::new("sharpen", 5).with_modifier(Modifier::Multiplicative(2.0), Some(DamageType::Piercing)),
            Passive::new("anger", 4).with_modifier(Modifier::Additive(3), None),
        ];
        assert_eq!(modified_damage(2, DamageType::Piercing, &passives), 10);
        assert_eq!(modified_damage(2, DamageType::Magic, &passives), 5);
    }

    #[test]
    fn callback_fires_once_and_passive_is_dropped() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let mut slime = Enemy::spawn(EnemyKind::Slime, Point::new(1, 1));
        if let Some(list) = slime.passives_mut() {
            list.push(Passive::new("marker", 2).on_expire(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        decay_passives(&mut slime);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(slime.passives().map(<[Passive]>::len), Some(1));

        decay_passives(&mut slime);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(slime.passives().map(<[Passive]>::len), Some(0));

        decay_passives(&mut slime);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn poison_drains_health_each_turn() {
        let mut slime = Enemy::spawn(EnemyKind::Sloth, Point::new(1, 1));
        let before = slime.damageable().map(|d| d.health().value).unwrap_or_default();
        if let Some(list) = slime.passives_mut() {
            list.push(Passive::new("poison", 8).with_regen(-1, 0));
        }
        decay_passives(&mut slime);
        decay_passives(&mut slime);
        let after = slime.damageable().map(|d| d.health().value).unwrap_or_default();
        assert_eq!(after, before - 2);
    }
}
