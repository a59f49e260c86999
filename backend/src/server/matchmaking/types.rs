use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::config::matchmaking::{NORMAL_SELECTOR, QUICKPLAY_SELECTOR};
use crate::server::game_session::channel::PlayerChannel;

pub type ParticipantId = Uuid;

/// Matchmaking pool a player picks with their first message.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QueueClass {
    /// Each turn must be played within the move deadline.
    Quickplay,
    Normal,
}

impl QueueClass {
    /// Order in which queues are scanned for a pair.
    pub const PRIORITY: [QueueClass; 2] = [QueueClass::Quickplay, QueueClass::Normal];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueClass::Quickplay => QUICKPLAY_SELECTOR,
            QueueClass::Normal => NORMAL_SELECTOR,
        }
    }

    /// Whether sessions of this class race every turn against a deadline.
    pub fn is_timed(&self) -> bool {
        matches!(self, QueueClass::Quickplay)
    }
}

impl fmt::Display for QueueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown queue class {0:?}")]
pub struct QueueClassError(pub String);

impl FromStr for QueueClass {
    type Err = QueueClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            QUICKPLAY_SELECTOR => Ok(QueueClass::Quickplay),
            NORMAL_SELECTOR => Ok(QueueClass::Normal),
            other => Err(QueueClassError(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Waiting,
    Playing,
    /// Terminal. The participant never re-enters a queue.
    Done,
}

/// A connected player, owned by the queue store while waiting and by its session once matched.
pub struct Participant {
    pub id: ParticipantId,
    pub status: Status,
    pub channel: PlayerChannel,
}

impl Participant {
    pub fn new(id: ParticipantId, channel: PlayerChannel) -> Self {
        Self {
            id,
            status: Status::Waiting,
            channel,
        }
    }

    /// Close the channel and mark the participant `Done`.
    pub fn finish(&mut self, reason: Option<actix_http::ws::CloseReason>) {
        self.channel.close(reason);
        self.status = Status::Done;
    }
}

impl fmt::Debug for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participant")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("closed", &self.channel.is_closed())
            .finish()
    }
}
