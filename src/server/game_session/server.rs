//! Room registry actor.
//!
//! Hands out the shared [`GameRoom`] for a room id and keeps track of the
//! websocket sessions attached to each room, which double as the room's
//! broadcast channel.

use std::collections::HashMap;
use std::sync::Arc;

use actix::prelude::*;
use log::{debug, info};
use parking_lot::Mutex;
use serde_json::Value;

use super::messages::{Connect, Disconnect, ServerEvent};
use super::session::HallwaySession;
use crate::game::broadcast::{Broadcast, Target};
use crate::game::{Game, GameRoom};
use crate::storage::DeckStore;

type SessionAddr = Addr<HallwaySession>;

/// Connected sessions of one room, by username.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionAddr>>,
}

impl SessionRegistry {
    fn insert(&self, username: &str, addr: SessionAddr) {
        self.sessions.lock().insert(username.to_string(), addr);
    }

    /// Drop the session unless it has been replaced by a newer connection.
    fn remove(&self, username: &str, addr: &SessionAddr) -> bool {
        let mut sessions = self.sessions.lock();
        if sessions.get(username) == Some(addr) {
            sessions.remove(username);
            true
        } else {
            false
        }
    }

    fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

impl Broadcast for SessionRegistry {
    fn emit(&self, event: &str, payload: Value, target: &Target) {
        let message = ServerEvent::new(event, payload);
        let sessions = self.sessions.lock();
        match target {
            Target::Room => {
                for addr in sessions.values() {
                    addr.do_send(message.clone());
                }
            }
            Target::Participant(username) => {
                if let Some(addr) = sessions.get(username) {
                    addr.do_send(message);
                }
            }
        }
    }
}

struct RoomEntry {
    room: Arc<GameRoom>,
    sessions: Arc<SessionRegistry>,
}

pub struct HallwayManager {
    rooms: HashMap<String, RoomEntry>,
    store: Arc<dyn DeckStore>,
}

impl HallwayManager {
    pub fn new(store: Arc<dyn DeckStore>) -> Self {
        Self { rooms: HashMap::new(), store }
    }

    fn entry(&mut self, room_id: &str, owner: &str) -> &RoomEntry {
        let store = Arc::clone(&self.store);
        self.rooms.entry(room_id.to_string()).or_insert_with(|| {
            info!("[HallwayManager] creating room {} owned by {}", room_id, owner);
            let sessions = Arc::new(SessionRegistry::default());
            let game = Game::new(room_id, Some(owner.to_string()));
            let room = GameRoom::new(game, sessions.clone(), store);
            RoomEntry { room, sessions }
        })
    }
}

impl Actor for HallwayManager {
    type Context = Context<Self>;
}

impl Handler<Connect> for HallwayManager {
    type Result = MessageResult<Connect>;

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) -> Self::Result {
        let entry = self.entry(&msg.room_id, &msg.username);
        entry.sessions.insert(&msg.username, msg.addr);
        let room = Arc::clone(&entry.room);
        room.join(&msg.username);
        MessageResult(room)
    }
}

impl Handler<Disconnect> for HallwayManager {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        let Some(entry) = self.rooms.get(&msg.room_id) else {
            return;
        };
        if !entry.sessions.remove(&msg.username, &msg.addr) {
            debug!("[HallwayManager] stale session of {} in {}", msg.username, msg.room_id);
            return;
        }
        entry.room.leave(&msg.username);

        if entry.sessions.is_empty() {
            info!("[HallwayManager] closing empty room {}", msg.room_id);
            if let Some(entry) = self.rooms.remove(&msg.room_id) {
                entry.room.shutdown();
            }
        }
    }
}
