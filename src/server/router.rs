//! HTTP and WebSocket routing configuration.

use actix_web::web;

use crate::config::server::ROOM_WS_PATH;
use crate::server::game_session::session::ws_hallway;

/// Every room is served by one websocket endpoint, keyed by room id.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(ROOM_WS_PATH).to(ws_hallway));
}
