use std::collections::HashMap;

use crate::player::player_id::PlayerId;

#[derive(Debug, PartialEq)]
pub enum TallyOutcome {
    Tie(Vec<PlayerId>),
    Leader(PlayerId),
}

/// Votes of the current voting round, keyed by voter. A voter only ever has one vote,
/// the last one cast.
#[derive(Default, Debug, Clone)]
pub struct Ballot {
    votes: HashMap<PlayerId, PlayerId>,
}

impl Ballot {
    pub fn cast(&mut self, voter: PlayerId, target: PlayerId) {
        self.votes.insert(voter, target);
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    pub fn votes(&self) -> &HashMap<PlayerId, PlayerId> {
        &self.votes
    }

    pub fn voters(&self) -> usize {
        self.votes.len()
    }

    /// Drops the vote cast by `player` and every vote targeting them. Returns whether
    /// anything was removed.
    pub fn purge(&mut self, player: &PlayerId) -> bool {
        let before = self.votes.len();
        self.votes
            .retain(|voter, target| voter != player && target != player);
        before != self.votes.len()
    }

    pub fn tally(&self) -> Option<TallyOutcome> {
        let mut counts: HashMap<&PlayerId, usize> = HashMap::new();
        for target in self.votes.values() {
            *counts.entry(target).or_default() += 1;
        }
        let max_votes = counts.values().copied().max()?;
        let mut leaders: Vec<PlayerId> = counts
            .into_iter()
            .filter(|(_, count)| *count == max_votes)
            .map(|(target, _)| target.clone())
            .collect();

        if leaders.len() > 1 {
            leaders.sort();
            Some(TallyOutcome::Tie(leaders))
        } else {
            leaders.pop().map(TallyOutcome::Leader)
        }
    }
}
