/// Starts a matched pair: announces each player's color, then runs the relay.
///
/// A pairing whose sockets are already gone never reaches the announcement: the
/// player still connected goes back to its queue. If an announcement fails after
/// that check, the match is abandoned and both players are closed, so nobody is
/// left `Playing` without a session.

use log::{info, warn};

use super::channel::ChannelError;
use super::relay::{Color, Session, SessionConfig, SessionSummary};
use crate::config::matchmaking::MATCH_ANNOUNCEMENT_PREFIX;
use crate::server::matchmaking::queue::Pairing;
use crate::server::matchmaking::types::{Participant, QueueClass};

/// How a pairing ended once handed to `start_match`.
#[derive(Debug)]
pub enum MatchOutcome {
    Played(SessionSummary),
    /// The opponent left before the announcement; this player should wait again.
    Requeue(QueueClass, Participant),
    Abandoned,
}

/// Text announcing `color` to the player who was assigned it.
pub fn match_announcement(color: Color) -> String {
    format!("{}{}", MATCH_ANNOUNCEMENT_PREFIX, color)
}

async fn announce(participant: &Participant, color: Color) -> Result<(), ChannelError> {
    participant.channel.send_text(match_announcement(color)).await
}

/// Announce the match and relay it to completion.
pub async fn start_match(pairing: Pairing, config: SessionConfig) -> MatchOutcome {
    let Pairing { mut white, mut black, class } = pairing;

    match (white.channel.is_connected(), black.channel.is_connected()) {
        (true, true) => (),
        (true, false) => return drop_departed(class, white, black),
        (false, true) => return drop_departed(class, black, white),
        (false, false) => {
            warn!("[Matchmaking] Match {} vs {} abandoned, both players left", white.id, black.id);
            white.finish(None);
            black.finish(None);
            return MatchOutcome::Abandoned;
        }
    }

    // Both sends are attempted even if the first one fails.
    let white_sent = announce(&white, Color::White).await;
    let black_sent = announce(&black, Color::Black).await;
    if let Err(err) = white_sent.and(black_sent) {
        warn!(
            "[Matchmaking] Match {} vs {} abandoned, announcement failed: {}",
            white.id, black.id, err
        );
        white.finish(None);
        black.finish(None);
        return MatchOutcome::Abandoned;
    }

    let session = Session::new(Pairing { white, black, class }, &config);
    info!("[Matchmaking] Session {} launched for {} match", session.game_id(), class);
    MatchOutcome::Played(session.run().await)
}

fn drop_departed(class: QueueClass, survivor: Participant, mut departed: Participant) -> MatchOutcome {
    info!(
        "[Matchmaking] Player {} left before the match started, {} goes back to {} queue",
        departed.id, survivor.id, class
    );
    departed.finish(None);
    MatchOutcome::Requeue(class, survivor)
}
