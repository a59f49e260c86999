/// WebSocket session handler for matchfinder clients.
///
/// This actor owns a single player's connection. The first text frame selects the queue;
/// once queued, every later data frame is pushed to whichever task owns the player's
/// channel (the queue store, then the game session), and frames sent by that task are
/// written back to the client.
use actix::prelude::*;
use actix_http::ws::CloseReason;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web::http::StatusCode;
use actix_web_actors::ws;
use log::{debug, info, warn};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use super::server::{Enqueue, Withdraw};
use super::types::{Participant, ParticipantId, QueueClass};
use crate::config::session::INBOUND_FRAME_LIMIT;
use crate::server::game_session::channel::PlayerChannel;
use crate::server::game_session::messages::{Inbound, Outbound};
use crate::server::ws_error::{http_error_response, ws_flooded_reason, ws_unknown_queue_reason};

/// What the socket has to do after the intake consumed a client frame.
#[derive(Debug)]
pub enum IntakeStep {
    Continue,
    /// Hand the new participant to the matchmaker.
    Join(Enqueue),
    /// Close the connection with this reason and stop.
    Close(CloseReason),
}

enum IntakeState {
    /// Connected, queue selector not received yet.
    AwaitingSelection,
    /// Handed to the matchmaker; frames go to the participant's channel.
    Queued { frames: mpsc::Sender<Inbound> },
    /// Rejected or flooded, the socket is going away.
    Closing,
}

/// Per-connection intake, kept apart from the actor context.
pub struct Intake {
    player_id: ParticipantId,
    state: IntakeState,
    joined: bool,
}

impl Intake {
    pub fn new(player_id: ParticipantId) -> Self {
        Self {
            player_id,
            state: IntakeState::AwaitingSelection,
            joined: false,
        }
    }

    /// Whether a participant was handed to the matchmaker for this connection.
    pub fn has_joined(&self) -> bool {
        self.joined
    }

    /// A text frame: the queue selector first, moves after that.
    ///
    /// `outbound` is only called for the selector, to wire the participant's channel.
    pub fn on_text(&mut self, text: &str, outbound: impl FnOnce() -> Recipient<Outbound>) -> IntakeStep {
        match self.state {
            IntakeState::AwaitingSelection => self.select_queue(text, outbound),
            IntakeState::Queued { .. } => self.push(Inbound::Text(text.to_string())),
            IntakeState::Closing => IntakeStep::Continue,
        }
    }

    pub fn on_binary(&mut self, bytes: &[u8]) -> IntakeStep {
        match self.state {
            IntakeState::AwaitingSelection => {
                warn!("[Intake] Player {} sent a binary queue selector", self.player_id);
                self.close(ws_unknown_queue_reason())
            }
            IntakeState::Queued { .. } => self.push(Inbound::Binary(bytes.to_vec())),
            IntakeState::Closing => IntakeStep::Continue,
        }
    }

    fn select_queue(&mut self, selector: &str, outbound: impl FnOnce() -> Recipient<Outbound>) -> IntakeStep {
        match selector.parse::<QueueClass>() {
            Ok(class) => {
                let (frames, inbound) = mpsc::channel(INBOUND_FRAME_LIMIT);
                let channel = PlayerChannel::new(inbound, outbound());
                self.state = IntakeState::Queued { frames };
                self.joined = true;
                IntakeStep::Join(Enqueue {
                    participant: Participant::new(self.player_id, channel),
                    class,
                })
            }
            Err(err) => {
                warn!("[Intake] Player {} dropped: {}", self.player_id, err);
                self.close(ws_unknown_queue_reason())
            }
        }
    }

    /// Push a data frame to the participant's channel without waiting.
    fn push(&mut self, frame: Inbound) -> IntakeStep {
        let IntakeState::Queued { frames } = &self.state else {
            return IntakeStep::Continue;
        };
        match frames.try_send(frame) {
            Ok(()) => IntakeStep::Continue,
            Err(TrySendError::Full(_)) => {
                warn!(
                    "[Intake] Player {} has {} unread frames, disconnecting",
                    self.player_id, INBOUND_FRAME_LIMIT
                );
                self.close(ws_flooded_reason())
            }
            Err(TrySendError::Closed(_)) => {
                debug!("[Intake] Player {} sent a frame after their channel closed", self.player_id);
                IntakeStep::Continue
            }
        }
    }

    /// Dropping the frame sender lets a running session see the disconnect.
    fn close(&mut self, reason: CloseReason) -> IntakeStep {
        self.state = IntakeState::Closing;
        IntakeStep::Close(reason)
    }
}

/// Represents a player's WebSocket connection.
pub struct PlayerSocket {
    pub player_id: ParticipantId,
    pub matchmaking_addr: Addr<super::server::MatchmakingServer>,
    intake: Intake,
}

impl PlayerSocket {
    pub fn new(player_id: ParticipantId, matchmaking_addr: Addr<super::server::MatchmakingServer>) -> Self {
        Self {
            player_id,
            matchmaking_addr,
            intake: Intake::new(player_id),
        }
    }

    fn apply(&mut self, step: IntakeStep, ctx: &mut ws::WebsocketContext<Self>) {
        match step {
            IntakeStep::Continue => (),
            IntakeStep::Join(enqueue) => self.matchmaking_addr.do_send(enqueue),
            IntakeStep::Close(reason) => {
                ctx.close(Some(reason));
                ctx.stop();
            }
        }
    }
}

impl Actor for PlayerSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[Intake] New player connected: {}", self.player_id);
    }

    /// Called when the socket stops. A player still waiting in a queue is withdrawn.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if self.intake.has_joined() {
            self.matchmaking_addr.do_send(Withdraw {
                player_id: self.player_id,
            });
        }
        debug!("[Intake] Player {} disconnected", self.player_id);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerSocket {
    /// Handles incoming WebSocket frames from the client.
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                let step = self.intake.on_text(&text, || ctx.address().recipient());
                self.apply(step, ctx);
            }
            Ok(ws::Message::Binary(bin)) => {
                let step = self.intake.on_binary(&bin);
                self.apply(step, ctx);
            }
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Pong(_)) | Ok(ws::Message::Nop) => (),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                warn!("[Intake] Player {} sent a fragmented frame", self.player_id);
                ctx.close(Some(ws::CloseCode::Unsupported.into()));
                ctx.stop();
            }
            Err(e) => {
                warn!("[Intake] Protocol error for player {}: {}", self.player_id, e);
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for PlayerSocket {
    type Result = ();

    /// Writes frames produced by the matchmaker or the game session to the client.
    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) {
        match msg {
            Outbound::Text(text) => ctx.text(text),
            Outbound::Close(reason) => {
                ctx.close(reason);
                ctx.stop();
            }
        }
    }
}

/// WebSocket endpoint for matchfinder clients.
///
/// Every connection gets a fresh player id; the first text frame must be a queue selector.
pub async fn ws_matchfinder(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    let socket = PlayerSocket::new(Uuid::new_v4(), data.matchmaking_addr.clone());
    ws::start(socket, &req, stream).or_else(|err| {
        warn!("[Intake] Upgrade failed: {}", err);
        Ok(http_error_response(
            "WS_UPGRADE_FAILED",
            "Expected a WebSocket upgrade request",
            None,
            StatusCode::BAD_REQUEST,
        ))
    })
}

/// JSON snapshot of the number of players waiting in each queue.
pub async fn queue_snapshot(data: web::Data<crate::server::state::AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.queues.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use actix_http::ws::CloseCode;
    use actix_web::App;
    use awc::ws;
    use futures::{SinkExt, Stream, StreamExt};

    use crate::server::game_session::channel::testing::socket;
    use crate::server::game_session::launch::match_announcement;
    use crate::server::game_session::relay::Color;
    use crate::server::game_session::SessionConfig;
    use crate::server::matchmaking::queue::{QueueSnapshot, QueueStore};
    use crate::server::matchmaking::server::MatchmakingServer;
    use crate::server::state::AppState;

    fn join(intake: &mut Intake, selector: &str) -> Enqueue {
        let (recorder, _frames) = socket();
        match intake.on_text(selector, || recorder.recipient()) {
            IntakeStep::Join(enqueue) => enqueue,
            other => panic!("expected to join, got {:?}", other),
        }
    }

    fn assert_closed(step: IntakeStep, description: &str) {
        match step {
            IntakeStep::Close(reason) => {
                assert_eq!(reason.code, CloseCode::Policy);
                assert_eq!(reason.description.as_deref(), Some(description));
            }
            other => panic!("expected a close, got {:?}", other),
        }
    }

    #[actix::test]
    async fn test_unknown_selector_is_rejected() {
        let (recorder, _frames) = socket();
        let mut intake = Intake::new(Uuid::new_v4());

        let step = intake.on_text("blitz", || recorder.clone().recipient());
        assert_closed(step, "Unknown queue class");
        assert!(!intake.has_joined());

        // Nothing after the rejection is taken as a selector.
        let late = intake.on_text("normal", || recorder.clone().recipient());
        assert!(matches!(late, IntakeStep::Continue));
        assert!(!intake.has_joined());
    }

    #[actix::test]
    async fn test_binary_selector_is_rejected() {
        let mut intake = Intake::new(Uuid::new_v4());
        assert_closed(intake.on_binary(b"normal"), "Unknown queue class");
        assert!(!intake.has_joined());
    }

    #[actix::test]
    async fn test_selector_joins_and_later_frames_are_forwarded() {
        let id = Uuid::new_v4();
        let mut intake = Intake::new(id);
        let Enqueue { mut participant, class } = join(&mut intake, "quickplay");
        assert_eq!(class, QueueClass::Quickplay);
        assert_eq!(participant.id, id);
        assert!(intake.has_joined());

        let (recorder, _frames) = socket();
        assert!(matches!(intake.on_text("e4", || recorder.recipient()), IntakeStep::Continue));
        assert!(matches!(intake.on_binary(&[1, 2]), IntakeStep::Continue));
        assert_eq!(participant.channel.recv().await, Some(Inbound::Text("e4".into())));
        assert_eq!(participant.channel.recv().await, Some(Inbound::Binary(vec![1, 2])));
    }

    #[actix::test]
    async fn test_flooding_client_is_cut_off() {
        let mut intake = Intake::new(Uuid::new_v4());
        let Enqueue { mut participant, .. } = join(&mut intake, "normal");
        let (recorder, _frames) = socket();

        for n in 0..INBOUND_FRAME_LIMIT {
            let step = intake.on_text(&n.to_string(), || recorder.clone().recipient());
            assert!(matches!(step, IntakeStep::Continue), "frame {} refused", n);
        }
        let step = intake.on_text("one too many", || recorder.clone().recipient());
        assert_closed(step, "Too many pending frames");
        assert!(matches!(intake.on_text("more", || recorder.clone().recipient()), IntakeStep::Continue));
        assert!(intake.has_joined());

        // Buffered frames are still readable, then the channel reports the disconnect.
        for n in 0..INBOUND_FRAME_LIMIT {
            assert_eq!(participant.channel.recv().await, Some(Inbound::Text(n.to_string())));
        }
        assert_eq!(participant.channel.recv().await, None);
    }

    #[actix::test]
    async fn test_frames_after_channel_close_are_dropped() {
        let mut intake = Intake::new(Uuid::new_v4());
        let Enqueue { mut participant, .. } = join(&mut intake, "normal");
        participant.channel.close(None);

        let (recorder, _frames) = socket();
        assert!(matches!(intake.on_text("e4", || recorder.recipient()), IntakeStep::Continue));
    }

    fn start_app() -> (actix_test::TestServer, Arc<QueueStore>) {
        let queues = Arc::new(QueueStore::new());
        let addr = MatchmakingServer::new(queues.clone(), SessionConfig::default()).start();
        let state = web::Data::new(AppState::new(addr, queues.clone()));
        let srv = actix_test::start(move || {
            App::new()
                .app_data(state.clone())
                .configure(crate::server::router::config)
        });
        (srv, queues)
    }

    async fn wait_for(queues: &QueueStore, expected: QueueSnapshot) {
        for _ in 0..250 {
            if queues.snapshot() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("queues stuck at {:?}, expected {:?}", queues.snapshot(), expected);
    }

    async fn next_frame<S>(conn: &mut S) -> Option<ws::Frame>
    where
        S: Stream<Item = Result<ws::Frame, actix_http::ws::ProtocolError>> + Unpin,
    {
        tokio::time::timeout(Duration::from_secs(5), conn.next())
            .await
            .ok()
            .flatten()
            .and_then(Result::ok)
    }

    fn is_policy_close(frame: &Option<ws::Frame>, description: &str) -> bool {
        matches!(
            frame,
            Some(ws::Frame::Close(Some(reason)))
                if reason.code == CloseCode::Policy && reason.description.as_deref() == Some(description)
        )
    }

    #[actix_web::test]
    async fn test_socket_with_unknown_selector_is_closed() {
        let (mut srv, queues) = start_app();
        let mut conn = srv.ws_at("/ws/matchfinder").await.unwrap();

        conn.send(ws::Message::Text("blitz".into())).await.unwrap();
        assert!(is_policy_close(&next_frame(&mut conn).await, "Unknown queue class"));
        assert_eq!(queues.snapshot(), QueueSnapshot::default());
    }

    #[actix_web::test]
    async fn test_socket_with_binary_selector_is_closed() {
        let (mut srv, queues) = start_app();
        let mut conn = srv.ws_at("/").await.unwrap();

        conn.send(ws::Message::Binary("normal".into())).await.unwrap();
        assert!(is_policy_close(&next_frame(&mut conn).await, "Unknown queue class"));
        assert_eq!(queues.snapshot(), QueueSnapshot::default());
    }

    #[actix_web::test]
    async fn test_socket_closed_while_queued_is_withdrawn() {
        let (mut srv, queues) = start_app();
        let mut conn = srv.ws_at("/ws/matchfinder").await.unwrap();

        conn.send(ws::Message::Text("quickplay".into())).await.unwrap();
        wait_for(&queues, QueueSnapshot { quickplay: 1, normal: 0 }).await;

        conn.send(ws::Message::Close(None)).await.unwrap();
        wait_for(&queues, QueueSnapshot::default()).await;
    }

    #[actix_web::test]
    async fn test_queued_sockets_are_matched_and_relayed() {
        let (mut srv, queues) = start_app();
        let mut white = srv.ws_at("/ws/matchfinder").await.unwrap();
        let mut black = srv.ws_at("/ws/matchfinder").await.unwrap();

        white.send(ws::Message::Text("normal".into())).await.unwrap();
        wait_for(&queues, QueueSnapshot { quickplay: 0, normal: 1 }).await;
        black.send(ws::Message::Text("normal".into())).await.unwrap();

        let announced = |frame: Option<ws::Frame>, color: Color| {
            matches!(frame, Some(ws::Frame::Text(text)) if text[..] == *match_announcement(color).as_bytes())
        };
        assert!(announced(next_frame(&mut white).await, Color::White));
        assert!(announced(next_frame(&mut black).await, Color::Black));
        assert_eq!(queues.snapshot(), QueueSnapshot::default());

        white.send(ws::Message::Text("e4".into())).await.unwrap();
        assert!(matches!(next_frame(&mut black).await, Some(ws::Frame::Text(text)) if &text[..] == b"e4"));
    }

    #[actix_web::test]
    async fn test_flooding_socket_is_closed_and_withdrawn() {
        let (mut srv, queues) = start_app();
        let mut conn = srv.ws_at("/ws/matchfinder").await.unwrap();

        conn.send(ws::Message::Text("normal".into())).await.unwrap();
        wait_for(&queues, QueueSnapshot { quickplay: 0, normal: 1 }).await;

        for n in 0..=INBOUND_FRAME_LIMIT {
            conn.send(ws::Message::Text(n.to_string().into())).await.unwrap();
        }
        assert!(is_policy_close(&next_frame(&mut conn).await, "Too many pending frames"));
        wait_for(&queues, QueueSnapshot::default()).await;
    }
}
