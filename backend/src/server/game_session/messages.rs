use actix::prelude::*;
use actix_http::ws::CloseReason;

/// Frame received from a player's socket once they are queued.
///
/// Only `Text` is a valid move; anything else ends the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Binary(Vec<u8>),
}

/// Frame the server pushes to a player's socket actor.
#[derive(Message, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
pub enum Outbound {
    Text(String),
    /// Close the socket (with an optional code and reason) and stop the actor.
    Close(Option<CloseReason>),
}
