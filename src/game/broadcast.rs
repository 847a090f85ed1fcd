//! Outbound notifications.
//!
//! Game logic never talks to connections directly: it queues [`Outgoing`]
//! messages and the owning room hands them to a [`Broadcast`] implementation
//! before releasing the game lock. Implementations must not call back into
//! the room.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Everyone connected to the room, spectators included.
    Room,
    Participant(String),
}

#[derive(Debug, Clone)]
pub struct Outgoing {
    pub event: &'static str,
    pub payload: Value,
    pub target: Target,
}

pub trait Broadcast: Send + Sync {
    /// Deliver `payload` under `event`. At most once, in order per target.
    fn emit(&self, event: &str, payload: Value, target: &Target);
}

/// Keeps every emitted event, for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingBroadcast {
    pub events: parking_lot::Mutex<Vec<(String, Value, Target)>>,
}

#[cfg(test)]
impl RecordingBroadcast {
    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|(name, _, _)| name == event).count()
    }

    pub fn sent_to(&self, username: &str, event: &str) -> Vec<Value> {
        self.events
            .lock()
            .iter()
            .filter(|(name, _, target)| {
                name == event && *target == Target::Participant(username.to_string())
            })
            .map(|(_, payload, _)| payload.clone())
            .collect()
    }
}

#[cfg(test)]
impl Broadcast for RecordingBroadcast {
    fn emit(&self, event: &str, payload: Value, target: &Target) {
        self.events.lock().push((event.to_string(), payload, target.clone()));
    }
}
