/// Game configuration constants.
/// 
/// This module defines the main gameplay parameters such as the tick rate,
/// board size, player limits and level population.
pub const TICK_RATE: u32 = 60; // Simulation ticks per second.

/// Side length of the square board in tiles. Must be a multiple of 3 whose third is odd.
pub const BOARD_SIZE: usize = 93;

/// Maximum number of players allowed in a room.
pub const MAX_PLAYERS: usize = 5;

/// Colors handed out to joining players, popped from the back.
pub const PLAYER_COLORS: [&str; MAX_PLAYERS] = ["blue", "red", "black", "purple", "green"];

/// Offsets from the spawn anchor, one per player slot.
pub const SPAWN_OFFSETS: [(i32, i32); MAX_PLAYERS] = [(0, 0), (1, 0), (-1, 0), (1, 1), (-1, 1)];

/// Number of room centers converted into enemy spawners.
pub const SPAWNER_COUNT: usize = 2;

/// Spawners stop producing once this many hostiles are alive.
pub const MAX_ENEMIES: usize = 20;

/// Number of chests scattered over the reachable area.
pub const CHEST_COUNT: usize = 12;

/// Weighted loot table used when filling chests: (weight, card name).
pub const CHEST_LOOT_TABLE: [(f32, &str); 5] = [
    (0.35, "spear"),
    (0.25, "magic dart"),
    (0.15, "axe"),
    (0.15, "heal"),
    (0.10, "fireball"),
];
