use serde::Serialize;

use crate::config::entities::{MONKEY_BALL_STATS, SLIME_STATS, SLOTH_STATS};
use crate::game::types::Point;

use super::{Damageable, Entity, EntityKind, Motion, Passive, Stat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Slime,
    Sloth,
    MonkeyBall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStats {
    pub hp: i32,
    pub damage: i32,
    pub cooldown: u32,
    pub path_cap: usize,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Slime, EnemyKind::Sloth, EnemyKind::MonkeyBall];

    pub fn stats(self) -> EnemyStats {
        let (hp, damage, cooldown, path_cap) = match self {
            EnemyKind::Slime => SLIME_STATS,
            EnemyKind::Sloth => SLOTH_STATS,
            EnemyKind::MonkeyBall => MONKEY_BALL_STATS,
        };
        EnemyStats { hp, damage, cooldown, path_cap }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Slime => "slime",
            EnemyKind::Sloth => "sloth",
            EnemyKind::MonkeyBall => "monkey_ball",
        }
    }
}

/// A hostile chasing the nearest living player.
#[derive(Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub hp: Stat,
    /// Dealt to a player on contact.
    pub damage: i32,
    pub path_cap: usize,
    pub passives: Vec<Passive>,
}

impl Enemy {
    pub fn spawn(kind: EnemyKind, position: Point) -> Entity {
        let stats = kind.stats();
        let enemy = Enemy {
            kind,
            hp: Stat::full(stats.hp),
            damage: stats.damage,
            path_cap: stats.path_cap,
            passives: Vec::new(),
        };
        Entity::new(uuid::Uuid::new_v4().to_string(), position, EntityKind::Enemy(enemy))
            .with_motion(Motion::new(stats.cooldown))
    }
}

impl Damageable for Enemy {
    fn health(&self) -> &Stat {
        &self.hp
    }

    fn health_mut(&mut self) -> &mut Stat {
        &mut self.hp
    }

    fn passives(&self) -> &[Passive] {
        &self.passives
    }

    fn passives_mut(&mut self) -> &mut Vec<Passive> {
        &mut self.passives
    }
}
