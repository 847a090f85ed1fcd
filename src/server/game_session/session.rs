//! Websocket session of one participant in a room.
//!
//! The session registers with the [`HallwayManager`] when it starts, keeps
//! the room handle it gets back and forwards every client message to it.
//! Anything the room emits for this participant arrives as a
//! [`ServerEvent`] and is written to the socket.

use std::borrow::Cow;
use std::sync::Arc;

use actix::prelude::*;
use actix_web::http::StatusCode;
use actix_web::{Error, HttpRequest, HttpResponse, web};
use actix_web_actors::ws;
use log::{error, warn};

use super::messages::{ClientMessage, Connect, Disconnect, ServerEvent};
use super::server::HallwayManager;
use crate::game::GameRoom;
use crate::server::ws_error::{http_error_response, ws_error_message};

pub struct HallwaySession {
    pub room_id: String,
    pub username: String,
    pub manager: Addr<HallwayManager>,
    room: Option<Arc<GameRoom>>,
}

impl HallwaySession {
    pub fn new(room_id: String, username: String, manager: Addr<HallwayManager>) -> Self {
        Self { room_id, username, manager, room: None }
    }

    fn dispatch(&self, room: &Arc<GameRoom>, message: ClientMessage) {
        let username = self.username.as_str();
        match message {
            ClientMessage::Start => room.start(username),
            ClientMessage::Action { key, extra } => room.action(username, &key, extra),
            ClientMessage::Chat { message } => room.chat(username, &message),
            ClientMessage::GameState => room.request_state(username),
            ClientMessage::AddCard { card_name } => room.add_card(username, &card_name),
            ClientMessage::RemoveCard { card_name } => room.remove_card(username, &card_name),
            ClientMessage::ChangeColor { color } => room.change_color(username, &color),
            ClientMessage::Ping => {}
        }
    }
}

impl Actor for HallwaySession {
    type Context = ws::WebsocketContext<Self>;

    /// Registers with the room and holds back other messages until it is known.
    fn started(&mut self, ctx: &mut Self::Context) {
        self.manager
            .send(Connect {
                room_id: self.room_id.clone(),
                username: self.username.clone(),
                addr: ctx.address(),
            })
            .into_actor(self)
            .then(|result, act, ctx| {
                match result {
                    Ok(room) => act.room = Some(room),
                    Err(e) => {
                        error!("[HallwaySession] {} cannot join {}: {}", act.username, act.room_id, e);
                        ctx.stop();
                    }
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    fn stopped(&mut self, ctx: &mut Self::Context) {
        self.manager.do_send(Disconnect {
            room_id: self.room_id.clone(),
            username: self.username.clone(),
            addr: ctx.address(),
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for HallwaySession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                let message = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("[HallwaySession] invalid message from {}: {}", self.username, e);
                        ctx.text(ws_error_message("INVALID_MESSAGE", "Invalid client message", Some(self.username.as_str())));
                        return;
                    }
                };
                match &self.room {
                    Some(room) => self.dispatch(room, message),
                    None => ctx.text(ws_error_message("NOT_CONNECTED", "Not connected to a room", Some(self.room_id.as_str()))),
                }
            }
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                warn!("[HallwaySession] protocol error from {}: {}", self.username, e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<ServerEvent> for HallwaySession {
    type Result = ();

    fn handle(&mut self, msg: ServerEvent, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                error!("[HallwaySession] cannot serialize {} for {}: {}", msg.event, self.username, e);
                ctx.text(ws_error_message("INTERNAL", "Internal server error", None));
            }
        }
    }
}

/// Websocket endpoint of a room. Expects a `username` query parameter.
pub async fn ws_hallway(
    req: HttpRequest,
    stream: web::Payload,
    room_id: web::Path<String>,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    let username = req
        .query_string()
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(key, _)| *key == "username")
        .map(|(_, value)| urlencoding::decode(value).unwrap_or(Cow::Borrowed("")).trim().to_string())
        .unwrap_or_default();

    if username.is_empty() {
        return Ok(http_error_response(
            "MISSING_USERNAME",
            "Missing username",
            Some(room_id.as_str()),
            StatusCode::BAD_REQUEST,
        ));
    }

    ws::start(
        HallwaySession::new(room_id.into_inner(), username, data.hallway_manager.clone()),
        &req,
        stream,
    )
}
