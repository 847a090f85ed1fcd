/// Server configuration constants.

/// Address the HTTP server binds to.
pub const BIND_HOST: &str = "127.0.0.1";
pub const BIND_PORT: u16 = 8080;

/// WebSocket endpoint for game rooms.
pub const ROOM_WS_PATH: &str = "/ws/hallway/{room_id}";
