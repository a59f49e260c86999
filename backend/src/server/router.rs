//! HTTP and WebSocket routing configuration.
//!
//! Defines the matchfinder WebSocket endpoint and the queue snapshot endpoint.
//! Each WebSocket connection is handled by its own `PlayerSocket` actor.

use actix_web::web;
use crate::server::matchmaking::session::{queue_snapshot, ws_matchfinder};

/// Configure the application's HTTP/WebSocket routes.
///
/// `/` accepts WebSocket upgrades as well, for clients that connect to the bare host.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/ws/matchfinder")
            .route(web::get().to(ws_matchfinder))
    )
    .service(
        web::resource("/queues")
            .route(web::get().to(queue_snapshot))
    )
    .service(
        web::resource("/")
            .route(web::get().to(ws_matchfinder))
    );
}
