pub mod actor;
pub mod actor_client;
pub mod ballot;
pub mod event;
pub mod room_fsm;

use rand::seq::SliceRandom;
use rust_fsm::StateMachine;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::player::player_id::PlayerId;
use crate::player::Player;
use crate::room::ballot::{Ballot, TallyOutcome};
use crate::room::event::{Notification, Recipient, Role, RoomEvent};
use crate::room::room_fsm::{RoomFsm, RoomFsmInput, RoomFsmState};
use crate::word_bank::WordBank;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScheduledTransition {
    ResumeVoting,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingTransition {
    pub ticket: u64,
    pub transition: ScheduledTransition,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RoundOutcome {
    CitizenEliminated,
    ImpostorCaught,
    ImpostorWins,
}

/// Side effects produced by the room. The room itself never touches channels or
/// timers, whoever drives it drains these with `take_effects`.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Notify(Notification),
    Schedule {
        ticket: u64,
        transition: ScheduledTransition,
    },
    CancelSchedule,
}

pub struct Room {
    id: String,
    word_bank: Arc<WordBank>,
    fsm: StateMachine<RoomFsm>,
    players: Vec<Player>,
    impostor_id: Option<PlayerId>,
    secret_word: Option<String>,
    ballot: Ballot,
    outcome: Option<RoundOutcome>,
    pending_transition: Option<PendingTransition>,
    last_ticket: u64,
    effects: Vec<Effect>,
}

impl Room {
    pub const MINIMUM_PLAYERS: usize = 3;
    // Alive players at or below which a surviving impostor can no longer be outvoted
    const IMPOSTOR_MAJORITY: usize = 2;

    pub fn new(id: &str, word_bank: Arc<WordBank>) -> Self {
        Self {
            id: id.to_string(),
            word_bank,
            fsm: StateMachine::default(),
            players: Vec::default(),
            impostor_id: None,
            secret_word: None,
            ballot: Ballot::default(),
            outcome: None,
            pending_transition: None,
            last_ticket: 0,
            effects: Vec::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> &RoomFsmState {
        self.fsm.state()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn impostor_id(&self) -> Option<&PlayerId> {
        self.impostor_id.as_ref()
    }

    pub fn secret_word(&self) -> Option<&str> {
        self.secret_word.as_deref()
    }

    pub fn votes(&self) -> &HashMap<PlayerId, PlayerId> {
        self.ballot.votes()
    }

    pub fn last_eliminated_was_impostor(&self) -> bool {
        self.outcome == Some(RoundOutcome::ImpostorCaught)
    }

    pub fn pending_transition(&self) -> Option<&PendingTransition> {
        self.pending_transition.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn join(&mut self, player_id: PlayerId, name: &str) -> Result<(), Error> {
        if self.phase() != &RoomFsmState::Join {
            return Err(Error::Domain(DomainError::RoomLocked(self.id.to_string())));
        }
        if self.get_player(&player_id).is_none() {
            self.players.push(Player::new(player_id, name));
        }
        self.notify_room_state();
        Ok(())
    }

    pub fn leave(&mut self, player_id: &PlayerId) -> Result<(), Error> {
        let index = self
            .players
            .iter()
            .position(|player| &player.id == player_id)
            .ok_or_else(|| DomainError::PlayerNotInRoom(player_id.to_string()))?;
        self.players.remove(index);

        if self.players.is_empty() {
            self.cancel_pending_transition();
            return Ok(());
        }

        let was_impostor = self.impostor_id.as_ref() == Some(player_id);
        if was_impostor && self.phase() != &RoomFsmState::Join {
            log::info!(
                "The impostor left the room, aborting the round. RoomId: '{}', PlayerId: '{player_id}'.",
                self.id
            );
            return self.reset_to_join();
        }

        self.notify_room_state();
        if self.phase() == &RoomFsmState::Vote {
            if self.ballot.purge(player_id) {
                self.notify_vote_state();
            }
            return self.check_tally();
        }
        Ok(())
    }

    pub fn start_round(&mut self, player_id: &PlayerId) -> Result<(), Error> {
        self.ensure_player_in_room(player_id)?;
        self.ensure_phase("start_round", RoomFsmState::Join)?;
        if self.players.len() < Room::MINIMUM_PLAYERS {
            return Err(Error::Domain(DomainError::NotEnoughPlayers(
                self.players.len(),
                Room::MINIMUM_PLAYERS,
            )));
        }

        for player in self.players.iter_mut() {
            player.alive = true;
        }
        let impostor_id = self
            .players
            .choose(&mut rand::thread_rng())
            .map(|player| player.id.clone());
        let word = self.word_bank.pick_random();
        self.ballot.clear();
        self.outcome = None;
        self.process_event(&RoomFsmInput::StartRound)?;

        for player in &self.players {
            let event = if Some(&player.id) == impostor_id.as_ref() {
                RoomEvent::Assignment {
                    role: Role::Impostor,
                    word: None,
                }
            } else {
                RoomEvent::Assignment {
                    role: Role::Citizen,
                    word: Some(word.clone()),
                }
            };
            self.effects.push(Effect::Notify(Notification {
                recipient: Recipient::Player(player.id.clone()),
                event,
            }));
        }
        self.impostor_id = impostor_id;
        self.secret_word = Some(word);
        self.notify_phase();
        Ok(())
    }

    pub fn start_vote(&mut self, player_id: &PlayerId) -> Result<(), Error> {
        self.ensure_phase("start_vote", RoomFsmState::Assigned)?;
        self.ensure_alive(player_id)?;

        self.ballot.clear();
        self.process_event(&RoomFsmInput::StartVote)?;
        self.notify_phase();
        self.notify_vote_state();
        Ok(())
    }

    pub fn cast_vote(&mut self, player_id: &PlayerId, target_id: &PlayerId) -> Result<(), Error> {
        self.ensure_phase("cast_vote", RoomFsmState::Vote)?;
        self.ensure_alive(player_id)?;
        if !self.is_alive(target_id) {
            return Err(Error::Domain(DomainError::TargetIsNotAlive(
                target_id.to_string(),
            )));
        }

        self.ballot.cast(player_id.clone(), target_id.clone());
        self.notify_vote_state();
        self.check_tally()
    }

    pub fn next_round(&mut self, player_id: &PlayerId) -> Result<(), Error> {
        self.ensure_phase("next_round", RoomFsmState::Results)?;
        self.ensure_alive(player_id)?;

        self.cancel_pending_transition();
        match self.outcome {
            Some(RoundOutcome::ImpostorCaught) | Some(RoundOutcome::ImpostorWins) => {
                self.reset_to_join()
            }
            _ => self.resume_voting(),
        }
    }

    /// Applies a previously scheduled transition, as long as it is still the pending
    /// one. Anything else is a stale timer and changes nothing.
    pub fn apply_scheduled_transition(&mut self, ticket: u64) -> Result<(), Error> {
        match self.pending_transition {
            Some(pending) if pending.ticket == ticket => {
                self.pending_transition = None;
                match pending.transition {
                    ScheduledTransition::ResumeVoting => self.resume_voting(),
                    ScheduledTransition::Reset => self.reset_to_join(),
                }
            }
            _ => Err(Error::Domain(DomainError::StaleTransition(ticket))),
        }
    }

    fn check_tally(&mut self) -> Result<(), Error> {
        let alive_players = self.alive_players().len();
        if self.ballot.voters() == 0 || self.ballot.voters() != alive_players {
            return Ok(());
        }

        match self.ballot.tally() {
            Some(TallyOutcome::Tie(tied_ids)) => {
                let tied_players: Vec<String> = self
                    .players
                    .iter()
                    .filter(|player| tied_ids.contains(&player.id))
                    .map(|player| player.name.clone())
                    .collect();
                let message = format!("Empate entre: {}. ¡Voten de nuevo!", tied_players.join(", "));
                self.ballot.clear();
                self.notify_room(RoomEvent::VoteTie {
                    tied_players,
                    message,
                });
                self.notify_vote_state();
                Ok(())
            }
            Some(TallyOutcome::Leader(eliminated_id)) => self.eliminate(&eliminated_id),
            None => Ok(()),
        }
    }

    fn eliminate(&mut self, eliminated_id: &PlayerId) -> Result<(), Error> {
        let eliminated_name = match self.get_player_mut(eliminated_id) {
            Some(player) => {
                player.alive = false;
                player.name.clone()
            }
            None => {
                return Err(Error::log_and_create_internal(&format!(
                    "Tried to eliminate player '{eliminated_id}' but it does not exist. RoomId: '{}'.",
                    self.id
                )))
            }
        };
        // Players see the elimination before they learn what it meant
        self.notify_room_state();

        let impostor_name = self
            .impostor_id
            .as_ref()
            .and_then(|impostor_id| self.get_player(impostor_id))
            .map(|player| player.name.clone())
            .unwrap_or_default();
        let eliminated_was_impostor = self.impostor_id.as_ref() == Some(eliminated_id);
        let impostor_is_alive = self
            .impostor_id
            .as_ref()
            .map(|impostor_id| self.is_alive(impostor_id))
            .unwrap_or(false);
        let impostor_wins =
            impostor_is_alive && self.alive_players().len() <= Room::IMPOSTOR_MAJORITY;

        self.process_event(&RoomFsmInput::Eliminate)?;
        if impostor_wins {
            self.outcome = Some(RoundOutcome::ImpostorWins);
            self.notify_room(RoomEvent::ImpostorWins {
                impostor_name,
                eliminated_name,
            });
            self.schedule(ScheduledTransition::Reset);
        } else if eliminated_was_impostor {
            self.outcome = Some(RoundOutcome::ImpostorCaught);
            self.notify_room(RoomEvent::RoundResults {
                impostor_name: Some(impostor_name),
                eliminated_name,
                eliminated_was_impostor,
            });
            self.schedule(ScheduledTransition::Reset);
        } else {
            self.outcome = Some(RoundOutcome::CitizenEliminated);
            self.notify_room(RoomEvent::RoundResults {
                impostor_name: None,
                eliminated_name,
                eliminated_was_impostor,
            });
            self.schedule(ScheduledTransition::ResumeVoting);
        }
        self.notify_phase();
        Ok(())
    }

    fn resume_voting(&mut self) -> Result<(), Error> {
        self.ballot.clear();
        self.process_event(&RoomFsmInput::ResumeVoting)?;
        self.notify_phase();
        self.notify_vote_state();
        Ok(())
    }

    fn reset_to_join(&mut self) -> Result<(), Error> {
        self.cancel_pending_transition();
        if self.phase() != &RoomFsmState::Join {
            self.process_event(&RoomFsmInput::Reset)?;
        }
        self.ballot.clear();
        self.impostor_id = None;
        self.secret_word = None;
        self.outcome = None;
        for player in self.players.iter_mut() {
            player.alive = true;
        }
        self.notify_room_state();
        Ok(())
    }

    fn schedule(&mut self, transition: ScheduledTransition) {
        self.last_ticket += 1;
        self.pending_transition = Some(PendingTransition {
            ticket: self.last_ticket,
            transition,
        });
        self.effects.push(Effect::Schedule {
            ticket: self.last_ticket,
            transition,
        });
    }

    fn cancel_pending_transition(&mut self) {
        if self.pending_transition.take().is_some() {
            self.effects.push(Effect::CancelSchedule);
        }
    }

    fn process_event(&mut self, event: &RoomFsmInput) -> Result<(), Error> {
        self.fsm.consume(event).map(|_| ()).map_err(|error| {
            Error::log_and_create_internal(&format!(
                "The fsm in state {:?} can't transition with an event {:?}. Error: '{error}'.",
                self.fsm.state(),
                event
            ))
        })
    }

    fn ensure_phase(&self, action: &str, expected: RoomFsmState) -> Result<(), Error> {
        if self.phase() == &expected {
            Ok(())
        } else {
            Err(Error::Domain(DomainError::InvalidPhase(
                action.to_string(),
                self.phase().clone(),
                expected,
            )))
        }
    }

    fn ensure_player_in_room(&self, player_id: &PlayerId) -> Result<(), Error> {
        self.get_player(player_id)
            .map(|_| ())
            .ok_or_else(|| Error::Domain(DomainError::PlayerNotInRoom(player_id.to_string())))
    }

    fn ensure_alive(&self, player_id: &PlayerId) -> Result<(), Error> {
        self.ensure_player_in_room(player_id)?;
        if self.is_alive(player_id) {
            Ok(())
        } else {
            Err(Error::Domain(DomainError::PlayerIsNotAlive(
                player_id.to_string(),
            )))
        }
    }

    fn get_player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| &player.id == player_id)
    }

    fn get_player_mut(&mut self, player_id: &PlayerId) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| &player.id == player_id)
    }

    fn is_alive(&self, player_id: &PlayerId) -> bool {
        self.get_player(player_id)
            .map(|player| player.alive)
            .unwrap_or(false)
    }

    fn alive_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|player| player.alive).collect()
    }

    fn notify_room(&mut self, event: RoomEvent) {
        self.effects.push(Effect::Notify(Notification {
            recipient: Recipient::Room,
            event,
        }));
    }

    fn notify_room_state(&mut self) {
        self.notify_room(RoomEvent::RoomState {
            players: self.players.clone(),
            phase: self.phase().clone(),
        });
    }

    fn notify_phase(&mut self) {
        self.notify_room(RoomEvent::Phase {
            value: self.phase().clone(),
        });
    }

    fn notify_vote_state(&mut self) {
        self.notify_room(RoomEvent::VoteState {
            votes: self.ballot.votes().clone(),
        });
    }
}
