// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the matchmaking actor address and the queue store it pairs players from.
//! Used to share state between HTTP/WebSocket handlers and the actor system.

use std::sync::Arc;

use actix::Addr;
use crate::server::matchmaking::queue::QueueStore;
use crate::server::matchmaking::server::MatchmakingServer;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the matchmaking server actor (queues players, launches sessions).
    pub matchmaking_addr: Addr<MatchmakingServer>,
    /// Waiting players, read directly for queue snapshots.
    pub queues: Arc<QueueStore>,
}

impl AppState {
    /// Create a new AppState with the given actor address and queue store.
    pub fn new(
        matchmaking_addr: Addr<MatchmakingServer>,
        queues: Arc<QueueStore>,
    ) -> Self {
        AppState {
            matchmaking_addr,
            queues,
        }
    }
}
