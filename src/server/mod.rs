//! Server layer root module.
//!
//! - Application state shared with handlers
//! - HTTP/WebSocket routing
//! - Room registry and per-participant websocket sessions

pub mod game_session;
pub mod router;
pub mod state;
pub mod ws_error;
