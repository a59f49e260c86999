/// Matchmaking server actor.
///
/// Receives queued players from the intake sockets, pairs them through the queue store,
/// and launches every pairing as an independent session task.

use actix::prelude::*;
use std::sync::Arc;
use log::{debug, info};

use super::queue::QueueStore;
use super::types::{Participant, ParticipantId, QueueClass};
use crate::server::game_session::launch::{start_match, MatchOutcome};
use crate::server::game_session::relay::SessionConfig;

/// Main matchmaking server actor.
pub struct MatchmakingServer {
    /// Waiting players, shared with the HTTP handlers for snapshots.
    queues: Arc<QueueStore>,
    /// Settings handed to every launched session.
    session_config: SessionConfig,
}

impl MatchmakingServer {
    /// Create a new matchmaking server.
    pub fn new(queues: Arc<QueueStore>, session_config: SessionConfig) -> Self {
        Self {
            queues,
            session_config,
        }
    }

    /// Launch a session for every pair the queue store can form.
    ///
    /// A player whose opponent left before the start is sent back through `addr`.
    fn launch_ready_matches(&self, addr: Addr<Self>) {
        while let Some(pairing) = self.queues.try_match() {
            let config = self.session_config.clone();
            let addr = addr.clone();
            actix::spawn(async move {
                match start_match(pairing, config).await {
                    MatchOutcome::Played(summary) => info!(
                        "[Matchmaking] Session {} ({}) finished: {:?}, {} moves, White={} Black={}",
                        summary.game_id,
                        summary.class,
                        summary.end,
                        summary.moves_relayed,
                        summary.white.id,
                        summary.black.id
                    ),
                    MatchOutcome::Requeue(class, participant) => addr.do_send(Requeue { participant, class }),
                    MatchOutcome::Abandoned => (),
                }
            });
        }
    }
}

/// Message: a player picked a queue.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct Enqueue {
    pub participant: Participant,
    pub class: QueueClass,
}

/// Message: a matched player's opponent left before the session started.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Requeue {
    pub participant: Participant,
    pub class: QueueClass,
}

/// Message: a waiting player's socket went away. Returns whether they were still queued.
#[derive(Message)]
#[rtype(result = "bool")]
pub struct Withdraw {
    pub player_id: ParticipantId,
}

impl Actor for MatchmakingServer {
    type Context = Context<Self>;
}

impl Handler<Enqueue> for MatchmakingServer {
    type Result = ();

    /// Queues the player, then pairs whoever can be paired.
    fn handle(&mut self, msg: Enqueue, ctx: &mut Self::Context) -> Self::Result {
        info!("[Matchmaking] Player {} joined {} queue", msg.participant.id, msg.class);
        self.queues.enqueue(msg.class, msg.participant);
        self.launch_ready_matches(ctx.address());
    }
}

impl Handler<Requeue> for MatchmakingServer {
    type Result = ();

    /// Returns the player to the head of its queue; gone players are dropped instead.
    fn handle(&mut self, msg: Requeue, ctx: &mut Self::Context) -> Self::Result {
        let Requeue { mut participant, class } = msg;
        if !participant.channel.is_connected() {
            debug!("[Matchmaking] Player {} left before being requeued", participant.id);
            participant.finish(None);
            return;
        }
        self.queues.requeue(class, participant);
        self.launch_ready_matches(ctx.address());
    }
}

impl Handler<Withdraw> for MatchmakingServer {
    type Result = bool;

    /// Removes a disconnected player from its queue; no-op once matched.
    fn handle(&mut self, msg: Withdraw, _ctx: &mut Self::Context) -> Self::Result {
        match self.queues.withdraw(msg.player_id) {
            Some((class, _)) => {
                info!("[Matchmaking] Player {} disconnected while waiting in {} queue", msg.player_id, class);
                true
            }
            None => {
                debug!("[Matchmaking] Player {} not queued, nothing to withdraw", msg.player_id);
                false
            }
        }
    }
}
