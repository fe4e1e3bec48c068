use rand::seq::SliceRandom;

use crate::error::{Error, Result};
use crate::models::{PollOption, Vote};

// Tally of a whole poll
pub struct PollTally {
    pub total_votes: usize,
    pub counts: Vec<VoteCount>,
}

// Per-option share of the poll's votes
#[derive(Debug, Clone, PartialEq)]
pub struct VoteCount {
    pub option_id: i64,
    pub option_text: String,
    pub votes: usize,
    pub percentage: f64,
}

/// Count votes per option and each option's share of the poll total.
/// Returns `None` when no votes have been cast at all; callers report
/// that instead of dividing by zero.
pub fn tally(option_counts: &[(PollOption, usize)]) -> Option<PollTally> {
    let total_votes: usize = option_counts.iter().map(|(_, votes)| votes).sum();
    if total_votes == 0 {
        return None;
    }

    let counts = option_counts
        .iter()
        .map(|(option, votes)| VoteCount {
            option_id: option.id,
            option_text: option.option_text.clone(),
            votes: *votes,
            percentage: *votes as f64 / total_votes as f64 * 100.0,
        })
        .collect();

    Some(PollTally {
        total_votes,
        counts,
    })
}

/// Pick one voter uniformly at random among an option's votes.
pub fn pick_winner(option_id: i64, votes: &[Vote]) -> Result<&Vote> {
    votes
        .choose(&mut rand::thread_rng())
        .ok_or(Error::NoVotes(option_id))
}
