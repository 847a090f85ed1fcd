/// Level generator configuration constants.

/// Every logical cell is upscaled into a SCALE x SCALE block of tiles.
pub const SCALE: usize = 3;

/// Number of rejection-sampling attempts when placing rooms.
pub const ROOM_ATTEMPTS: usize = 30;

/// Smallest and largest room side, in logical cells. Both odd.
pub const ROOM_MIN_SIZE: usize = 3;
pub const ROOM_MAX_SIZE: usize = 7;

/// Probability that a connector opened between two regions becomes a door.
pub const DOOR_PERCENTAGE: f64 = 0.5;

/// Number of edge cells opened per connectivity pass.
pub const CONNECTIONS_PER_PASS: usize = 2;

/// One floor tile in CLUTTER_CHANCE receives a rubbish item.
pub const CLUTTER_CHANCE: u32 = 31;

/// Attempts made before giving up on placing a chest or spawned enemy.
pub const PLACEMENT_ATTEMPTS: usize = 64;
