//! Duplex message channel owned by a participant.
//!
//! The socket actor keeps the sending half of the bounded inbound queue and
//! receives outbound frames through its `Recipient<Outbound>`; whoever owns the
//! `Participant` (queue store, then session) owns this end.

use actix::{MailboxError, Recipient};
use actix_http::ws::CloseReason;
use tokio::sync::mpsc;

use super::messages::{Inbound, Outbound};

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel already closed")]
    Closed,
    #[error("socket unreachable: {0}")]
    Mailbox(#[from] MailboxError),
}

pub struct PlayerChannel {
    inbound: mpsc::Receiver<Inbound>,
    outbound: Recipient<Outbound>,
    closed: bool,
}

impl PlayerChannel {
    pub fn new(inbound: mpsc::Receiver<Inbound>, outbound: Recipient<Outbound>) -> Self {
        Self {
            inbound,
            outbound,
            closed: false,
        }
    }

    /// Wait for the next frame from the remote side.
    ///
    /// Returns `None` once the socket is gone or the channel was closed locally.
    /// Cancel-safe: dropping the future before it resolves loses no frame.
    pub async fn recv(&mut self) -> Option<Inbound> {
        if self.closed {
            return None;
        }
        self.inbound.recv().await
    }

    /// Deliver a text frame, waiting until the socket actor has handled it.
    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.outbound.send(Outbound::Text(text.into())).await?;
        Ok(())
    }

    /// Close the remote socket. Only the first call has any effect.
    pub fn close(&mut self, reason: Option<CloseReason>) {
        if std::mem::replace(&mut self.closed, true) {
            return;
        }
        self.inbound.close();
        self.outbound.do_send(Outbound::Close(reason));
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the socket actor behind this channel is still running.
    pub fn is_connected(&self) -> bool {
        !self.closed && self.outbound.connected()
    }
}
