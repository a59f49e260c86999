/// Turn relay for a matched pair.
///
/// The session owns both participants and waits only on the turn holder's
/// channel. A text frame is forwarded verbatim to the opponent and the turn
/// flips; anything else ends the session. For timed classes every wait races a
/// deadline taken at the start of that turn.

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::{sleep_until, Instant};
use uuid::Uuid;

use super::channel::ChannelError;
use super::messages::Inbound;
use crate::config::session::MOVE_TIMEOUT_SECS;
use crate::server::matchmaking::queue::Pairing;
use crate::server::matchmaking::types::{Participant, QueueClass, Status};
use crate::server::ws_error::{ws_opponent_timed_out_reason, ws_timed_out_reason};

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Per-turn deadline for timed queue classes.
    pub move_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            move_timeout: Duration::from_secs(MOVE_TIMEOUT_SECS),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }

    fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session stopped. `side` is the player the condition was observed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// Disconnect, read failure, or a move that could not be forwarded.
    Error { side: Color },
    /// A non-text frame where a move was expected.
    ProtocolViolation { side: Color },
    /// The turn holder let the move deadline expire.
    Timeout { side: Color },
}

#[derive(Debug)]
pub struct SessionSummary {
    pub game_id: Uuid,
    pub class: QueueClass,
    pub end: SessionEnd,
    pub moves_relayed: u32,
    pub white: Participant,
    pub black: Participant,
}

enum TurnEvent {
    Frame(Option<Inbound>),
    Expired,
}

pub struct Session {
    game_id: Uuid,
    class: QueueClass,
    players: [Participant; 2],
    turn: Color,
    move_timeout: Option<Duration>,
    moves_relayed: u32,
}

impl Session {
    pub fn new(pairing: Pairing, config: &SessionConfig) -> Self {
        let Pairing { white, black, class } = pairing;
        Self {
            game_id: Uuid::new_v4(),
            class,
            players: [white, black],
            turn: Color::White,
            move_timeout: class.is_timed().then_some(config.move_timeout),
            moves_relayed: 0,
        }
    }

    pub fn game_id(&self) -> Uuid {
        self.game_id
    }

    fn player(&self, color: Color) -> &Participant {
        &self.players[color.index()]
    }

    /// Relay moves until the session ends, then release both participants.
    pub async fn run(mut self) -> SessionSummary {
        info!(
            "[Session] {} started ({}): White={} Black={}",
            self.game_id,
            self.class,
            self.player(Color::White).id,
            self.player(Color::Black).id
        );

        let end = loop {
            let side = self.turn;
            match self.next_event().await {
                TurnEvent::Frame(Some(Inbound::Text(mv))) => {
                    if let Err(err) = self.relay(mv).await {
                        warn!("[Session] {} could not forward move to {}: {}", self.game_id, side.opponent(), err);
                        break SessionEnd::Error { side: side.opponent() };
                    }
                }
                TurnEvent::Frame(Some(Inbound::Binary(bytes))) => {
                    warn!("[Session] {} {} sent a binary frame ({} bytes)", self.game_id, side, bytes.len());
                    break SessionEnd::ProtocolViolation { side };
                }
                TurnEvent::Frame(None) => {
                    info!("[Session] {} {} disconnected", self.game_id, side);
                    break SessionEnd::Error { side };
                }
                TurnEvent::Expired => {
                    info!("[Session] {} timeout reached for {} ({})", self.game_id, side, self.player(side).id);
                    break SessionEnd::Timeout { side };
                }
            }
        };

        self.release(end);
        info!(
            "[Session] {} ended: {:?} after {} moves",
            self.game_id, end, self.moves_relayed
        );

        let [white, black] = self.players;
        SessionSummary {
            game_id: self.game_id,
            class: self.class,
            end,
            moves_relayed: self.moves_relayed,
            white,
            black,
        }
    }

    /// Wait for the turn holder's next frame, or for the turn deadline.
    ///
    /// Whichever completes first wins; the other future is dropped, so neither
    /// a stale timer nor a late read can act on a later turn.
    async fn next_event(&mut self) -> TurnEvent {
        let timeout = self.move_timeout;
        let channel = &mut self.players[self.turn.index()].channel;
        match timeout {
            None => TurnEvent::Frame(channel.recv().await),
            Some(limit) => {
                let deadline = Instant::now() + limit;
                tokio::select! {
                    frame = channel.recv() => TurnEvent::Frame(frame),
                    _ = sleep_until(deadline) => TurnEvent::Expired,
                }
            }
        }
    }

    async fn relay(&mut self, mv: String) -> Result<(), ChannelError> {
        let mover = self.turn;
        debug!("[Session] {} received move from {}: {}", self.game_id, mover, mv);
        self.player(mover.opponent()).channel.send_text(mv).await?;
        self.moves_relayed += 1;
        self.turn = mover.opponent();
        Ok(())
    }

    /// Close both channels and mark both participants `Done`.
    fn release(&mut self, end: SessionEnd) {
        for color in [Color::White, Color::Black] {
            let reason = match end {
                SessionEnd::Timeout { side } if side == color => Some(ws_timed_out_reason()),
                SessionEnd::Timeout { .. } => Some(ws_opponent_timed_out_reason()),
                _ => None,
            };
            self.players[color.index()].finish(reason);
        }
        debug_assert!(self.players.iter().all(|p| p.status == Status::Done));
    }
}
