use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot::Sender as OneshotSender;

use crate::config::RoomSettings;
use crate::room::actor_client::RoomClient;
use crate::room_registry::actor_client::RoomRegistryClient;
use crate::room_registry::RoomRegistry;
use crate::word_bank::WordBank;

pub struct RoomRegistryActor {
    room_registry: RoomRegistry,
    room_registry_rx: Receiver<RoomRegistryCommand>,
    room_registry_tx: Sender<RoomRegistryCommand>,
}

impl RoomRegistryActor {
    /// Runs the RoomRegistry Actor in background and returns a Client to communicate with it
    pub fn spawn(room_settings: RoomSettings, word_bank: Arc<WordBank>) -> RoomRegistryClient {
        let room_registry = RoomRegistry::new(room_settings, word_bank);
        let (room_registry_tx, room_registry_rx): (
            Sender<RoomRegistryCommand>,
            Receiver<RoomRegistryCommand>,
        ) = mpsc::channel(512);

        tokio::spawn(
            RoomRegistryActor {
                room_registry,
                room_registry_rx,
                room_registry_tx: room_registry_tx.clone(),
            }
            .start(),
        );

        RoomRegistryClient { room_registry_tx }
    }

    async fn start(mut self) {
        while let Some(command) = self.room_registry_rx.recv().await {
            let response = match command {
                RoomRegistryCommand::GetOrCreateRoom {
                    room_id,
                    response_channel,
                } => {
                    let room = self.room_registry.get_or_create(
                        &room_id,
                        RoomRegistryClient {
                            room_registry_tx: self.room_registry_tx.clone(),
                        },
                    );
                    Some((RoomRegistryResponse::Room { room }, response_channel))
                }
                RoomRegistryCommand::RemoveRoom { room_id, instance } => {
                    let _ = self.room_registry.remove(&room_id, instance);
                    None
                }
                RoomRegistryCommand::CountRooms { response_channel } => Some((
                    RoomRegistryResponse::RoomCount {
                        count: self.room_registry.len(),
                    },
                    response_channel,
                )),
            };
            if let Some((response, response_tx)) = response {
                if let Err(response) = response_tx.send(response) {
                    log::error!("Sent RoomRegistryResponse but the response channel is closed. Response: '{response}'.");
                }
            }
        }
    }
}

#[derive(Debug)]
pub(crate) enum RoomRegistryCommand {
    GetOrCreateRoom {
        room_id: String,
        response_channel: OneshotSender<RoomRegistryResponse>,
    },
    RemoveRoom {
        room_id: String,
        instance: u64,
    },
    CountRooms {
        response_channel: OneshotSender<RoomRegistryResponse>,
    },
}

#[derive(Debug)]
pub(crate) enum RoomRegistryResponse {
    Room { room: RoomClient },
    RoomCount { count: usize },
}

impl Display for RoomRegistryResponse {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                RoomRegistryResponse::Room { room } => format!("Room(room_id: {})", room.room_id()),
                RoomRegistryResponse::RoomCount { count } => format!("RoomCount({count})"),
            }
        )
    }
}
