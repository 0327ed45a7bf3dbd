use axum::extract::ws::{Message, WebSocket};
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::error::Elapsed;
use tokio::time::timeout;

use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::metrics::CONNECTED_PLAYERS;
use crate::player::player_id::PlayerId;
use crate::room::actor_client::RoomClient;
use crate::room::event::RoomEvent;
use crate::room_registry::actor_client::RoomRegistryClient;
use crate::room_registry::RoomRegistry;
use crate::websocket::message::{WsMessageIn, WsMessageOut};
use crate::websocket::{close, parse_message, send_error, send_message, send_message_string};

/// One per connection. Turns frames into room commands and room events into frames.
pub struct PlayerActor {
    player_id: PlayerId,
    websocket: WebSocket,
    room_registry: RoomRegistryClient,
    room: Option<RoomClient>,
    events_tx: UnboundedSender<RoomEvent>,
    events_rx: UnboundedReceiver<RoomEvent>,
    inactivity_timeout: Duration,
}

impl PlayerActor {
    const ROOM_LOCKED_MESSAGE: &'static str = "La partida ya está en curso";
    // A room can stop right after the registry handed it out, a retry gets a fresh one
    const JOIN_ATTEMPTS: usize = 3;

    pub async fn create(
        websocket: WebSocket,
        room_registry: RoomRegistryClient,
        inactivity_timeout: Duration,
    ) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        PlayerActor {
            player_id: PlayerId::random(),
            websocket,
            room_registry,
            room: None,
            events_tx,
            events_rx,
            inactivity_timeout,
        }
        .start()
        .await
    }

    async fn start(mut self) {
        CONNECTED_PLAYERS.inc();
        log::info!("Player connected. PlayerId: '{}'.", self.player_id);

        let welcome = WsMessageOut::Welcome {
            player_id: self.player_id.to_string(),
        };
        if let Err(error) = send_message(&mut self.websocket, &welcome).await {
            self.log_connection_lost_with_player(&error.to_string());
        } else {
            self.run().await;
        }

        if let Some(room) = self.room.take() {
            // The room may already be gone, leaving is then implicit
            let _ = room.leave(&self.player_id).await;
        }
        close(self.websocket).await;
        CONNECTED_PLAYERS.dec();
    }

    async fn run(&mut self) {
        loop {
            select! {
                Some(event) = self.events_rx.recv() => {
                    if let Err(error) = send_message(&mut self.websocket, &WsMessageOut::from(event)).await {
                        self.log_connection_lost_with_player(&error.to_string());
                        break;
                    }
                },
                websocket_message = timeout(self.inactivity_timeout, self.websocket.recv()) => {
                    if let Err(error) = self.receive_websocket_message(websocket_message).await {
                        if PlayerActor::should_close_websocket(&error) {
                            if !matches!(error, Error::WebsocketClosed(_)) {
                                send_error(&mut self.websocket, &error).await;
                            }
                            break;
                        }
                        if matches!(error, Error::UnprocessableMessage(_, _)) {
                            send_error(&mut self.websocket, &error).await;
                        } else {
                            log::debug!("Ignored player action. PlayerId: '{}', Reason: '{error}'.", self.player_id);
                        }
                    }
                },
            }
        }
    }

    fn should_close_websocket(error: &Error) -> bool {
        match error {
            Error::Internal(_) => true,
            Error::WebsocketClosed(_) => true,
            Error::RoomClosed(_) => true,
            Error::UnprocessableMessage(_, _) => false,
            Error::Domain(_) => false,
        }
    }

    async fn receive_websocket_message(
        &mut self,
        websocket_message: Result<Option<Result<Message, axum::Error>>, Elapsed>,
    ) -> Result<(), Error> {
        match websocket_message {
            Ok(Some(Ok(Message::Text(txt)))) => match txt.as_str() {
                "ping" => send_message_string(&mut self.websocket, "pong").await,
                message => {
                    let message = parse_message(message)?;
                    self.handle_message(message).await
                }
            },
            // Control frames only keep the connection alive
            Ok(Some(Ok(Message::Ping(_)))) | Ok(Some(Ok(Message::Pong(_)))) => Ok(()),
            // browser said "close"
            Ok(Some(Ok(Message::Close(_)))) => {
                self.log_connection_lost_with_player("browser sent 'Close' websocket frame");
                Err(Error::WebsocketClosed(
                    "browser sent 'Close' websocket frame".to_string(),
                ))
            }
            // websocket was closed
            Ok(None) => {
                self.log_connection_lost_with_player("other end of websocket was closed abruptly");
                Err(Error::WebsocketClosed(
                    "other end of websocket was closed abruptly".to_string(),
                ))
            }
            // timeout without receiving anything from player
            Err(_) => {
                self.log_connection_lost_with_player(
                    "connection timed out; missing 'Ping' messages",
                );
                Err(Error::WebsocketClosed(
                    "connection timed out; missing 'Ping' messages".to_string(),
                ))
            }
            Ok(Some(Err(error))) => {
                self.log_connection_lost_with_player(&error.to_string());
                Err(Error::WebsocketClosed(error.to_string()))
            }
            Ok(Some(Ok(Message::Binary(_)))) => Err(Error::UnprocessableMessage(
                "Unsupported message type".to_string(),
                "binary frame".to_string(),
            )),
        }
    }

    async fn handle_message(&mut self, message: WsMessageIn) -> Result<(), Error> {
        if let WsMessageIn::JoinRoom { room_id, name } = message {
            return self.join_room(&room_id, &name).await;
        }

        let (room_id, action) = match &message {
            WsMessageIn::StartRound { room_id } => (room_id, "start_round"),
            WsMessageIn::StartVote { room_id } => (room_id, "start_vote"),
            WsMessageIn::CastVote { room_id, .. } => (room_id, "cast_vote"),
            WsMessageIn::NextRound { room_id } => (room_id, "next_round"),
            WsMessageIn::JoinRoom { room_id, .. } => (room_id, "join_room"),
        };
        let room = match &self.room {
            Some(room) if room.room_id() == RoomRegistry::normalize_room_id(room_id) => room,
            _ => {
                log::debug!(
                    "Ignored '{action}' for a room the player did not join. PlayerId: '{}', RoomId: '{room_id}'.",
                    self.player_id
                );
                return Ok(());
            }
        };

        match message {
            WsMessageIn::StartRound { .. } => room.start_round(&self.player_id).await,
            WsMessageIn::StartVote { .. } => room.start_vote(&self.player_id).await,
            WsMessageIn::CastVote { target_id, .. } => {
                room.cast_vote(&self.player_id, &PlayerId::from_owned(target_id))
                    .await
            }
            WsMessageIn::NextRound { .. } => room.next_round(&self.player_id).await,
            WsMessageIn::JoinRoom { .. } => Ok(()),
        }
    }

    async fn join_room(&mut self, room_id: &str, name: &str) -> Result<(), Error> {
        if let Some(room) = &self.room {
            log::debug!(
                "Player already joined a room, ignoring join_room. PlayerId: '{}', RoomId: '{}'.",
                self.player_id,
                room.room_id()
            );
            return Ok(());
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            let room = self.room_registry.get_or_create_room(room_id).await?;
            match room
                .join(&self.player_id, name, self.events_tx.clone())
                .await
            {
                Ok(()) => {
                    log::info!(
                        "Player joined room. PlayerId: '{}', RoomId: '{}'.",
                        self.player_id,
                        room.room_id()
                    );
                    self.room = Some(room);
                    return Ok(());
                }
                Err(Error::Domain(DomainError::RoomLocked(_))) => {
                    return send_message(
                        &mut self.websocket,
                        &WsMessageOut::RoomLocked {
                            message: PlayerActor::ROOM_LOCKED_MESSAGE.to_string(),
                        },
                    )
                    .await;
                }
                Err(Error::RoomClosed(_)) if attempts < PlayerActor::JOIN_ATTEMPTS => {
                    log::debug!("Room {} closed while joining, retrying.", room.room_id());
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn log_connection_lost_with_player(&self, reason: &str) {
        log::info!(
            "Connection with player {} lost due to: {}. Stopping player actor.",
            &self.player_id,
            reason,
        );
    }
}
