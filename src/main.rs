//! Main entry point for the backend server.
//!
//! Starts the room registry actor and the HTTP server carrying the room
//! websocket endpoint.

use std::sync::Arc;

use actix::Actor;
use actix_web::{App, HttpServer, web};
use log::info;

use config::server::{BIND_HOST, BIND_PORT};
use server::game_session::HallwayManager;
use storage::InMemoryDeckStore;

pub mod config;
mod game;
mod server;
mod storage;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let store = Arc::new(InMemoryDeckStore::new());
    let hallway_manager = HallwayManager::new(store).start();
    let state = web::Data::new(server::state::AppState::new(hallway_manager));

    info!("Listening on {}:{}", BIND_HOST, BIND_PORT);
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind((BIND_HOST, BIND_PORT))?
    .run()
    .await
}
