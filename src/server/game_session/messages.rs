use std::sync::Arc;

use actix::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::session::HallwaySession;
use crate::game::GameRoom;

/// Client -> server.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", content = "data")]
pub enum ClientMessage {
    /// Readiness toggle; the owner's also launches the game.
    Start,
    Action { key: String, extra: Option<u32> },
    Chat { message: String },
    /// Ask for a full state export.
    GameState,
    AddCard { card_name: String },
    RemoveCard { card_name: String },
    ChangeColor { color: String },
    Ping,
}

/// Server -> client: `{"event": ..., "data": ...}`.
#[derive(Message, Serialize, Clone, Debug)]
#[rtype(result = "()")]
pub struct ServerEvent {
    pub event: String,
    pub data: Value,
}

impl ServerEvent {
    pub fn new(event: &str, data: Value) -> Self {
        Self { event: event.to_string(), data }
    }
}

/// Register a session with a room, creating the room on first use.
#[derive(Message)]
#[rtype(result = "Arc<GameRoom>")]
pub struct Connect {
    pub room_id: String,
    pub username: String,
    pub addr: Addr<HallwaySession>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub room_id: String,
    pub username: String,
    pub addr: Addr<HallwaySession>,
}
