use thiserror::Error;

use crate::room::room_fsm::RoomFsmState;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("The round is already in progress, new players cannot join. RoomId: '{0}'.")]
    RoomLocked(String),
    #[error("Not enough players to start the round. ActualPlayers: '{0}', MinimumPlayers: '{1}'.")]
    NotEnoughPlayers(usize, usize),
    #[error("Invalid phase for '{0}'. ActualPhase: '{1:?}', ExpectedPhase: '{2:?}'.")]
    InvalidPhase(String, RoomFsmState, RoomFsmState),
    #[error("The player is not in the room. PlayerId: '{0}'.")]
    PlayerNotInRoom(String),
    #[error("An eliminated player cannot act. PlayerId: '{0}'.")]
    PlayerIsNotAlive(String),
    #[error("Only alive players can be voted. TargetId: '{0}'.")]
    TargetIsNotAlive(String),
    #[error("The scheduled transition is stale. Ticket: '{0}'.")]
    StaleTransition(u64),
}
