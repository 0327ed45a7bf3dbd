use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedSender};
use tokio::sync::oneshot::Sender as OneshotSender;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::RoomSettings;
use crate::error::Error;
use crate::metrics::ACTIVE_ROOMS;
use crate::player::player_id::PlayerId;
use crate::room::actor_client::RoomClient;
use crate::room::event::{Notification, Recipient, RoomEvent};
use crate::room::{Effect, Room, ScheduledTransition};
use crate::room_registry::actor_client::RoomRegistryClient;
use crate::word_bank::WordBank;

/// Owns one `Room` and serializes every action on it: player commands and the room's
/// own scheduled transitions all go through the same queue.
pub struct RoomActor {
    room: Room,
    instance: u64,
    room_rx: Receiver<RoomCommand>,
    room_tx: Sender<RoomCommand>,
    members: HashMap<PlayerId, UnboundedSender<RoomEvent>>,
    room_registry: RoomRegistryClient,
    settings: RoomSettings,
    timer: Option<JoinHandle<()>>,
}

impl RoomActor {
    pub fn spawn(
        id: &str,
        instance: u64,
        settings: RoomSettings,
        word_bank: Arc<WordBank>,
        room_registry: RoomRegistryClient,
    ) -> RoomClient {
        let room = Room::new(id, word_bank);
        let (room_tx, room_rx): (Sender<RoomCommand>, Receiver<RoomCommand>) = mpsc::channel(128);

        tokio::spawn(
            RoomActor {
                room,
                instance,
                room_rx,
                room_tx: room_tx.clone(),
                members: HashMap::default(),
                room_registry,
                settings,
                timer: None,
            }
            .start(),
        );

        RoomClient::new(id, instance, room_tx)
    }

    async fn start(mut self) {
        ACTIVE_ROOMS.inc();
        log::info!(
            "Room started. RoomId: '{}', Instance: '{}'.",
            self.room.id(),
            self.instance
        );
        let inactivity_timeout = self.settings.inactivity_timeout();

        loop {
            match time::timeout(inactivity_timeout, self.room_rx.recv()).await {
                Err(_) => {
                    if self.room.is_empty() {
                        log::info!(
                            "No players joined room {} after {} seconds. Stopping room actor.",
                            self.room.id(),
                            inactivity_timeout.as_secs()
                        );
                        break;
                    }
                }
                Ok(None) => {
                    log::info!("Room channel has been dropped. Stopping room actor.");
                    break;
                }
                Ok(Some(command)) => {
                    self.handle_command(command);
                    self.apply_effects();
                    if self.room.is_empty() {
                        log::info!(
                            "All players left room {}. Stopping room actor.",
                            self.room.id()
                        );
                        break;
                    }
                }
            }
        }

        self.stop_room().await;
        ACTIVE_ROOMS.dec();
    }

    fn handle_command(&mut self, command: RoomCommand) {
        let (action, player_id, result) = match command {
            RoomCommand::Join {
                player_id,
                name,
                events_tx,
                response_tx,
            } => {
                let result = self.room.join(player_id.clone(), &name);
                if result.is_ok() {
                    self.members.insert(player_id.clone(), events_tx);
                }
                let response = match result {
                    Ok(_) => RoomResponse::Joined,
                    Err(error) => RoomResponse::Error { error },
                };
                if let Err(response) = response_tx.send(response) {
                    log::error!("Sent RoomResponse to Player {player_id} but the response channel is closed. Removing the Player. Response: '{response}'.");
                    self.members.remove(&player_id);
                    let _ = self.room.leave(&player_id);
                }
                return;
            }
            RoomCommand::Leave { player_id } => {
                self.members.remove(&player_id);
                ("leave", Some(player_id.clone()), self.room.leave(&player_id))
            }
            RoomCommand::StartRound { player_id } => {
                let result = self.room.start_round(&player_id);
                ("start_round", Some(player_id), result)
            }
            RoomCommand::StartVote { player_id } => {
                let result = self.room.start_vote(&player_id);
                ("start_vote", Some(player_id), result)
            }
            RoomCommand::CastVote {
                player_id,
                target_id,
            } => {
                let result = self.room.cast_vote(&player_id, &target_id);
                ("cast_vote", Some(player_id), result)
            }
            RoomCommand::NextRound { player_id } => {
                let result = self.room.next_round(&player_id);
                ("next_round", Some(player_id), result)
            }
            RoomCommand::ScheduledTransition { ticket } => {
                ("scheduled_transition", None, self.room.apply_scheduled_transition(ticket))
            }
        };

        match result {
            Ok(_) => {}
            Err(Error::Domain(error)) => log::debug!(
                "Ignored '{action}' in room {}. PlayerId: '{}', Reason: '{error}'.",
                self.room.id(),
                player_id.map(|id| id.to_string()).unwrap_or_default()
            ),
            Err(error) => log::error!(
                "Could not process '{action}' in room {}. Error: '{error}'.",
                self.room.id()
            ),
        }
    }

    fn apply_effects(&mut self) {
        for effect in self.room.take_effects() {
            match effect {
                Effect::Notify(Notification {
                    recipient: Recipient::Room,
                    event,
                }) => {
                    for (player_id, events_tx) in &self.members {
                        if events_tx.send(event.clone()).is_err() {
                            log::debug!("Player {player_id} is no longer listening to room {}.", self.room.id());
                        }
                    }
                }
                Effect::Notify(Notification {
                    recipient: Recipient::Player(player_id),
                    event,
                }) => match self.members.get(&player_id) {
                    Some(events_tx) => {
                        if events_tx.send(event).is_err() {
                            log::debug!("Player {player_id} is no longer listening to room {}.", self.room.id());
                        }
                    }
                    None => log::error!(
                        "Tried to notify player {player_id} but it is not a member of room {}.",
                        self.room.id()
                    ),
                },
                Effect::Schedule { ticket, transition } => {
                    self.schedule_transition(ticket, self.delay_of(transition))
                }
                Effect::CancelSchedule => self.cancel_timer(),
            }
        }
    }

    fn delay_of(&self, transition: ScheduledTransition) -> Duration {
        match transition {
            ScheduledTransition::ResumeVoting => self.settings.round_advance_delay(),
            ScheduledTransition::Reset => self.settings.restart_delay(),
        }
    }

    fn schedule_transition(&mut self, ticket: u64, delay: Duration) {
        self.cancel_timer();
        let room_tx = self.room_tx.clone();
        self.timer = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            // The room may be gone already, nothing to do then
            let _ = room_tx
                .send(RoomCommand::ScheduledTransition { ticket })
                .await;
        }));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    async fn stop_room(mut self) {
        self.room_rx.close();
        self.cancel_timer();
        let room_id = self.room.id().to_string();
        if let Err(error) = self
            .room_registry
            .remove_room(&room_id, self.instance)
            .await
        {
            log::error!("The RoomRegistry channel is closed, can't remove the Room. RoomId: '{room_id}', Error: '{error}'.");
        }
    }
}

pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        events_tx: UnboundedSender<RoomEvent>,
        response_tx: OneshotSender<RoomResponse>,
    },
    Leave {
        player_id: PlayerId,
    },
    StartRound {
        player_id: PlayerId,
    },
    StartVote {
        player_id: PlayerId,
    },
    CastVote {
        player_id: PlayerId,
        target_id: PlayerId,
    },
    NextRound {
        player_id: PlayerId,
    },
    ScheduledTransition {
        ticket: u64,
    },
}

#[derive(Debug)]
pub(crate) enum RoomResponse {
    Joined,
    Error { error: Error },
}

impl Display for RoomResponse {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                RoomResponse::Joined => "RoomResponse::Joined".to_string(),
                RoomResponse::Error { error } => format!("Error '{error}'"),
            }
        )
    }
}
