use tokio::sync::mpsc::{Sender, UnboundedSender};
use tokio::sync::oneshot::{self, Receiver as OneshotReceiver, Sender as OneshotSender};

use crate::error::Error;
use crate::player::player_id::PlayerId;
use crate::room::actor::{RoomCommand, RoomResponse};
use crate::room::event::RoomEvent;

#[derive(Clone, Debug)]
pub struct RoomClient {
    room_id: String,
    instance: u64,
    room_tx: Sender<RoomCommand>,
}

impl RoomClient {
    pub(crate) fn new(room_id: &str, instance: u64, room_tx: Sender<RoomCommand>) -> Self {
        RoomClient {
            room_id: room_id.to_string(),
            instance,
            room_tx,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// True once the room actor stopped listening. A closed room is never revived.
    pub fn is_closed(&self) -> bool {
        self.room_tx.is_closed()
    }

    /// Joins the room. From now on every event for this player arrives, in order, on
    /// `events_tx`.
    pub async fn join(
        &self,
        player_id: &PlayerId,
        name: &str,
        events_tx: UnboundedSender<RoomEvent>,
    ) -> Result<(), Error> {
        let (tx, rx): (OneshotSender<RoomResponse>, OneshotReceiver<RoomResponse>) =
            oneshot::channel();

        self.send_command(RoomCommand::Join {
            player_id: player_id.clone(),
            name: name.to_string(),
            events_tx,
            response_tx: tx,
        })
        .await?;

        match rx.await {
            Ok(RoomResponse::Joined) => Ok(()),
            Ok(RoomResponse::Error { error }) => Err(error),
            // The room stopped between accepting the command and answering it
            Err(_) => Err(Error::RoomClosed(self.room_id.to_string())),
        }
    }

    pub async fn leave(&self, player_id: &PlayerId) -> Result<(), Error> {
        self.send_command(RoomCommand::Leave {
            player_id: player_id.clone(),
        })
        .await
    }

    pub async fn start_round(&self, player_id: &PlayerId) -> Result<(), Error> {
        self.send_command(RoomCommand::StartRound {
            player_id: player_id.clone(),
        })
        .await
    }

    pub async fn start_vote(&self, player_id: &PlayerId) -> Result<(), Error> {
        self.send_command(RoomCommand::StartVote {
            player_id: player_id.clone(),
        })
        .await
    }

    pub async fn cast_vote(&self, player_id: &PlayerId, target_id: &PlayerId) -> Result<(), Error> {
        self.send_command(RoomCommand::CastVote {
            player_id: player_id.clone(),
            target_id: target_id.clone(),
        })
        .await
    }

    pub async fn next_round(&self, player_id: &PlayerId) -> Result<(), Error> {
        self.send_command(RoomCommand::NextRound {
            player_id: player_id.clone(),
        })
        .await
    }

    async fn send_command(&self, command: RoomCommand) -> Result<(), Error> {
        self.room_tx.send(command).await.map_err(|_| {
            log::debug!(
                "Tried to send a RoomCommand but the Room is not listening. RoomId: '{}', Instance: '{}'.",
                self.room_id,
                self.instance
            );
            Error::RoomClosed(self.room_id.to_string())
        })
    }
}
