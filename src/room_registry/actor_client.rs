use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot::error::RecvError;
use tokio::sync::oneshot::{self, Receiver as OneshotReceiver, Sender as OneshotSender};

use crate::error::Error;
use crate::room::actor_client::RoomClient;
use crate::room_registry::actor::{RoomRegistryCommand, RoomRegistryResponse};

#[derive(Clone, Debug)]
pub struct RoomRegistryClient {
    pub(super) room_registry_tx: Sender<RoomRegistryCommand>,
}

impl RoomRegistryClient {
    pub async fn get_or_create_room(&self, room_id: &str) -> Result<RoomClient, Error> {
        let (tx, rx): (
            OneshotSender<RoomRegistryResponse>,
            OneshotReceiver<RoomRegistryResponse>,
        ) = oneshot::channel();

        self.send_command(
            RoomRegistryCommand::GetOrCreateRoom {
                room_id: room_id.to_string(),
                response_channel: tx,
            },
            "The RoomRegistry channel is closed",
        )
        .await?;

        match rx.await {
            Ok(RoomRegistryResponse::Room { room }) => Ok(room),
            error => Err(RoomRegistryClient::handle_response_error(error)),
        }
    }

    pub async fn remove_room(&self, room_id: &str, instance: u64) -> Result<(), Error> {
        self.send_command(
            RoomRegistryCommand::RemoveRoom {
                room_id: room_id.to_string(),
                instance,
            },
            "The RoomRegistry channel is closed",
        )
        .await
    }

    pub async fn count_rooms(&self) -> Result<usize, Error> {
        let (tx, rx): (
            OneshotSender<RoomRegistryResponse>,
            OneshotReceiver<RoomRegistryResponse>,
        ) = oneshot::channel();

        self.send_command(
            RoomRegistryCommand::CountRooms {
                response_channel: tx,
            },
            "The RoomRegistry channel is closed",
        )
        .await?;

        match rx.await {
            Ok(RoomRegistryResponse::RoomCount { count }) => Ok(count),
            error => Err(RoomRegistryClient::handle_response_error(error)),
        }
    }

    async fn send_command(
        &self,
        command: RoomRegistryCommand,
        error_message: &str,
    ) -> Result<(), Error> {
        self.room_registry_tx.send(command).await.map_err(|error| {
            Error::log_and_create_internal(&format!("{error_message}. Error: '{error}'"))
        })
    }

    fn handle_response_error(error: Result<RoomRegistryResponse, RecvError>) -> Error {
        match error {
            Ok(unexpected_response) => Error::log_and_create_internal(&format!(
                "Received an unexpected RoomRegistryResponse. RoomRegistryResponse: '{unexpected_response}'."
            )),
            Err(_) => Error::log_and_create_internal(
                "Sent a command to the RoomRegistry actor, but the actor channel died.",
            ),
        }
    }
}
