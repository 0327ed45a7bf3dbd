use std::fmt;

use rust_fsm::state_machine;

/*
 * Join
 *    Players join, the round starts with 3 or more players
 * Assigned
 *    Roles and word handed out, players discuss
 * Vote
 *    Ties re-vote, a single leader gets eliminated
 * Results
 *    Back to Vote if the impostor survived and the game goes on, otherwise back to Join
 */
state_machine! {
    derive(Debug, Clone, PartialEq)
    pub RoomFsm(Join)

    Join => {
        StartRound => Assigned
    },
    Assigned => {
        StartVote => Vote,
        Reset => Join,
    },
    Vote => {
        Eliminate => Results,
        Reset => Join,
    },
    Results => {
        ResumeVoting => Vote,
        Reset => Join,
    }
}

impl RoomFsmState {
    /// Name of the phase as it travels on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomFsmState::Join => "join",
            RoomFsmState::Assigned => "assigned",
            RoomFsmState::Vote => "vote",
            RoomFsmState::Results => "results",
        }
    }
}

impl fmt::Display for RoomFsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
