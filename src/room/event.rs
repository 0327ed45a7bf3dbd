use serde::Serialize;
use std::collections::HashMap;

use crate::player::player_id::PlayerId;
use crate::player::Player;
use crate::room::room_fsm::RoomFsmState;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Impostor,
    Citizen,
}

/// Something the room tells its players. Whether it reaches one player or all of them
/// is decided by the `Recipient` of the surrounding `Notification`.
#[derive(Clone, Debug, PartialEq)]
pub enum RoomEvent {
    RoomState {
        players: Vec<Player>,
        phase: RoomFsmState,
    },
    Assignment {
        role: Role,
        word: Option<String>,
    },
    Phase {
        value: RoomFsmState,
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
}

#[derive(Clone, Debug, PartialEq)]
pub enum Recipient {
    Room,
    Player(PlayerId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub recipient: Recipient,
    pub event: RoomEvent,
}
