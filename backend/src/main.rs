//! Main entry point for the matchfinder server.
//!
//! Initializes logging and the matchmaking actor, then launches the HTTP server
//! with the WebSocket endpoint players connect to.

use std::sync::Arc;
use std::time::Duration;

use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::info;

use config::server::{BIND_ADDR_ENV, DEFAULT_BIND_ADDR, IO_TIMEOUT_SECS};
use server::game_session::SessionConfig;
use server::matchmaking::queue::QueueStore;
use server::matchmaking::server::MatchmakingServer;

pub mod config;
mod server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (RUST_LOG).
    env_logger::init();

    // Queues shared by the matchmaking actor and the snapshot endpoint.
    let queues = Arc::new(QueueStore::new());

    // Start the MatchmakingServer actor (pairs players, launches sessions).
    let matchmaking_addr = MatchmakingServer::new(queues.clone(), SessionConfig::default()).start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(matchmaking_addr, queues));

    let bind_addr = std::env::var(BIND_ADDR_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    info!("[Server] Starting matchfinder on {}", bind_addr);

    // Start the HTTP server with the WebSocket endpoint.
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .client_request_timeout(Duration::from_secs(IO_TIMEOUT_SECS))
    .client_disconnect_timeout(Duration::from_secs(IO_TIMEOUT_SECS))
    .bind(bind_addr)?
    .run()
    .await
}
