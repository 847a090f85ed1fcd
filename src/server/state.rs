//! Application state shared with the HTTP/WebSocket handlers.

use actix::Addr;

use crate::server::game_session::HallwayManager;

pub struct AppState {
    /// Room registry; hands out rooms to websocket sessions.
    pub hallway_manager: Addr<HallwayManager>,
}

impl AppState {
    pub fn new(hallway_manager: Addr<HallwayManager>) -> Self {
        AppState { hallway_manager }
    }
}
