use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::player::player_id::PlayerId;
use crate::player::Player;
use crate::room::event::{Role, RoomEvent};

/// Frames a client sends. `roomId` is carried by every action so a client can tell rooms
/// apart, the connection still only ever acts on the room it joined.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(
    tag = "kind",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum WsMessageIn {
    JoinRoom {
        #[serde(default)]
        room_id: String,
        #[serde(default)]
        name: String,
    },
    StartRound {
        #[serde(default)]
        room_id: String,
    },
    StartVote {
        #[serde(default)]
        room_id: String,
    },
    CastVote {
        #[serde(default)]
        room_id: String,
        target_id: String,
    },
    NextRound {
        #[serde(default)]
        room_id: String,
    },
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(
    tag = "kind",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum WsMessageOut {
    Welcome {
        player_id: String,
    },
    RoomState {
        players: Vec<PlayerDto>,
        phase: String,
    },
    Assignment {
        role: Role,
        #[serde(skip_serializing_if = "Option::is_none")]
        word: Option<String>,
    },
    Phase {
        value: String,
    },
    VoteState {
        votes: HashMap<PlayerId, PlayerId>,
    },
    VoteTie {
        tied_players: Vec<String>,
        message: String,
    },
    RoundResults {
        impostor_name: Option<String>,
        eliminated_name: String,
        eliminated_was_impostor: bool,
    },
    ImpostorWins {
        impostor_name: String,
        eliminated_name: String,
    },
    RoomLocked {
        message: String,
    },
    Error {
        r#type: String,
        title: String,
        detail: String,
    },
}

#[derive(Serialize, Debug, PartialEq)]
pub struct PlayerDto {
    id: PlayerId,
    name: String,
    alive: bool,
}

impl From<Player> for PlayerDto {
    fn from(player: Player) -> Self {
        PlayerDto {
            id: player.id,
            name: player.name,
            alive: player.alive,
        }
    }
}

impl From<RoomEvent> for WsMessageOut {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::RoomState { players, phase } => WsMessageOut::RoomState {
                players: players.into_iter().map(PlayerDto::from).collect(),
                phase: phase.as_str().to_string(),
            },
            RoomEvent::Assignment { role, word } => WsMessageOut::Assignment { role, word },
            RoomEvent::Phase { value } => WsMessageOut::Phase {
                value: value.as_str().to_string(),
            },
            RoomEvent::VoteState { votes } => WsMessageOut::VoteState { votes },
            RoomEvent::VoteTie {
                tied_players,
                message,
            } => WsMessageOut::VoteTie {
                tied_players,
                message,
            },
            RoomEvent::RoundResults {
                impostor_name,
                eliminated_name,
                eliminated_was_impostor,
            } => WsMessageOut::RoundResults {
                impostor_name,
                eliminated_name,
                eliminated_was_impostor,
            },
            RoomEvent::ImpostorWins {
                impostor_name,
                eliminated_name,
            } => WsMessageOut::ImpostorWins {
                impostor_name,
                eliminated_name,
            },
        }
    }
}
