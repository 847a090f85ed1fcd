//! A room: one game, its tick thread and its outward channels.
//!
//! Request handlers and the tick thread share the game behind one mutex.
//! Everything a call queues for clients is flushed before the lock is
//! released, so each client sees messages in the order they were built.
//! The tick thread parks on a condition variable while the game is not
//! running and is woken by a successful start.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use parking_lot::{Condvar, Mutex};

use crate::config::game::TICK_RATE;
use crate::game::broadcast::{Broadcast, Outgoing, Target};
use crate::game::cards::deck::Deck;
use crate::game::commands::ChatOutcome;
use crate::game::error::{GameError, GameResult};
use crate::game::state::Game;
use crate::storage::DeckStore;

pub struct GameRoom {
    pub id: String,
    game: Mutex<Game>,
    wake: Condvar,
    worker: Mutex<Option<JoinHandle<()>>>,
    broadcaster: Arc<dyn Broadcast>,
    store: Arc<dyn DeckStore>,
}

impl GameRoom {
    pub fn new(game: Game, broadcaster: Arc<dyn Broadcast>, store: Arc<dyn DeckStore>) -> Arc<Self> {
        Arc::new(Self {
            id: game.room_id.clone(),
            game: Mutex::new(game),
            wake: Condvar::new(),
            worker: Mutex::new(None),
            broadcaster,
            store,
        })
    }

    /// Run `f` under the game lock and deliver what it queued.
    pub fn with_game<T>(&self, f: impl FnOnce(&mut Game) -> T) -> T {
        let mut game = self.game.lock();
        let result = f(&mut game);
        self.flush(game.drain_outbox());
        result
    }

    fn flush(&self, outgoing: Vec<Outgoing>) {
        for message in outgoing {
            self.broadcaster.emit(message.event, message.payload, &message.target);
        }
    }

    /// Tell `username` what went wrong with their request.
    fn report(&self, username: &str, result: GameResult<()>) {
        if let Err(e) = result {
            debug!("[Room {}] {} rejected: {}", self.id, username, e);
            self.with_game(|game| game.notify(username, &e));
        }
    }

    pub fn is_running(&self) -> bool {
        self.game.lock().is_running()
    }

    pub fn player_count(&self) -> usize {
        self.game.lock().players().count()
    }

    pub fn join(&self, username: &str) {
        let stored = self.store.load_or_create(username);
        let result = self.with_game(|game| game.join(username, Deck::from_stored(&stored)));
        self.report(username, result);
    }

    pub fn leave(&self, username: &str) {
        self.with_game(|game| game.leave(username));
    }

    /// Readiness toggle; the owner's start also launches the game.
    pub fn start(self: &Arc<Self>, username: &str) {
        match self.with_game(|game| game.start(username)) {
            Ok(true) => self.run_worker(),
            Ok(false) => {}
            Err(e) => self.report(username, Err(e)),
        }
    }

    pub fn action(&self, username: &str, key: &str, extra: Option<u32>) {
        let result = self.with_game(|game| game.action(username, key, extra));
        self.report(username, result);
    }

    pub fn chat(self: &Arc<Self>, username: &str, text: &str) {
        match self.with_game(|game| game.chat(username, text)) {
            Ok(ChatOutcome::Restarted) => self.run_worker(),
            Ok(_) => {}
            Err(e) => self.report(username, Err(e)),
        }
    }

    pub fn request_state(&self, username: &str) {
        self.with_game(|game| game.send_full_state(username));
    }

    pub fn change_color(&self, username: &str, color: &str) {
        let result = self.with_game(|game| game.change_color(username, color));
        self.report(username, result);
    }

    pub fn add_card(&self, username: &str, card: &str) {
        let result = self.with_game(|game| game.add_card(username, card));
        self.persist(username, result);
    }

    pub fn remove_card(&self, username: &str, card: &str) {
        let result = self.with_game(|game| game.remove_card(username, card));
        self.persist(username, result);
    }

    fn persist(&self, username: &str, result: GameResult<crate::storage::StoredDeck>) {
        match result {
            Ok(deck) => self.store.save(username, &deck),
            Err(e) => self.report(username, Err(e)),
        }
    }

    /// Spawn the tick thread if needed and wake it.
    fn run_worker(self: &Arc<Self>) {
        let mut worker = self.worker.lock();
        if worker.is_none() {
            let room = Arc::clone(self);
            match thread::Builder::new().name(format!("hallway-{}", self.id)).spawn(move || room.run()) {
                Ok(handle) => *worker = Some(handle),
                Err(e) => {
                    error!("[Room {}] cannot spawn tick thread: {}", self.id, e);
                    let failure = GameError::Configuration(e.to_string());
                    self.with_game(|game| {
                        game.emit(failure.event(), serde_json::json!(failure.to_string()), Target::Room)
                    });
                    return;
                }
            }
        }
        self.wake.notify_all();
    }

    fn run(&self) {
        let period = Duration::from_secs(1) / TICK_RATE;
        info!("[Room {}] tick thread started", self.id);
        loop {
            let started = {
                let mut game = self.game.lock();
                while !game.is_running() && !game.closed {
                    debug!("[Room {}] tick thread parked", self.id);
                    self.wake.wait(&mut game);
                }
                if game.closed {
                    break;
                }
                let started = Instant::now();
                game.tick();
                self.flush(game.drain_outbox());
                started
            };

            let elapsed = started.elapsed();
            match period.checked_sub(elapsed) {
                Some(rest) => thread::sleep(rest),
                None => warn!("[Room {}] tick overran by {:?}", self.id, elapsed - period),
            }
        }
        info!("[Room {}] tick thread stopped", self.id);
    }

    /// Stop the tick thread for good.
    pub fn shutdown(&self) {
        self.game.lock().closed = true;
        self.wake.notify_all();
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("[Room {}] tick thread panicked", self.id);
            }
        }
    }

    #[cfg(test)]
    pub fn tick_once(&self) {
        self.with_game(Game::tick);
    }
}
