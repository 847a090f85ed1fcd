/// Entity tuning constants: movement, stats and sight.

/// Ticks between two steps of a player.
pub const PLAYER_MOVEMENT_COOLDOWN: u32 = 8;

/// Maximum number of planned steps per player turn.
pub const PLAYER_MAX_MOVEMENT: usize = 10;

pub const PLAYER_MAX_HP: i32 = 15;
pub const PLAYER_MAX_MANA: i32 = 10;
pub const PLAYER_START_MANA: i32 = 5;
pub const PLAYER_MANA_REGEN: i32 = 1;

/// Cards held in hand during a game.
pub const HAND_SIZE: usize = 4;

/// Maximum number of cards in an active deck.
pub const MAX_DECK_SIZE: usize = 20;

/// Ticks between two steps of an ability entity.
pub const ABILITY_MOVEMENT_COOLDOWN: u32 = 4;

/// Default animation frame duration, in ticks.
pub const FRAME_DURATION: u32 = 5;

/// How far a player sees straight ahead, and how wide the cone spreads.
pub const SIGHT_RANGE: i32 = 8;
pub const SIGHT_SPREAD: i32 = 6;

/// Radius of the area always visible around a player, facing aside.
pub const SIGHT_AURA: i32 = 2;

/// Spawned enemies appear within this many cells of their spawner.
pub const SPAWN_RADIUS: i32 = 4;

/// Hostile tuning: hit points, contact damage, ticks between steps and the
/// longest path followed in one enemy turn.
pub const SLIME_STATS: (i32, i32, u32, usize) = (4, 1, 10, 4);
pub const SLOTH_STATS: (i32, i32, u32, usize) = (8, 3, 20, 2);
pub const MONKEY_BALL_STATS: (i32, i32, u32, usize) = (3, 1, 5, 6);

/// Ticks a door takes to swing open once unlocked.
pub const DOOR_OPENING_TICKS: u32 = 4 * FRAME_DURATION;
