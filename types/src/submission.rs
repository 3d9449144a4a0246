use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::MAX_NAME_LENGTH;

/// How a submitted session ended. Dirt/gem-only sessions never terminate and
/// are therefore never submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalOutcome {
    Bust,
    Jackpot,
}

impl FinalOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalOutcome::Bust => "bust",
            FinalOutcome::Jackpot => "jackpot",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bust" => Some(FinalOutcome::Bust),
            "jackpot" => Some(FinalOutcome::Jackpot),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionInvariantError {
    #[error("display name too long (len={len}, max={max})")]
    NameTooLong { len: usize, max: usize },
    #[error("submission has zero digs")]
    NoDigs,
}

/// Final tally forwarded to the persistence collaborator on a terminal
/// transition. Uniqueness and ordering are the collaborator's concern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub player_id: String,
    pub display_name: String,
    pub score: u64,
    pub digs: u32,
    pub outcome: FinalOutcome,
    pub submitted_at_ms: u64,
}

impl SubmissionRecord {
    pub fn validate_invariants(&self) -> Result<(), SubmissionInvariantError> {
        if self.display_name.len() > MAX_NAME_LENGTH {
            return Err(SubmissionInvariantError::NameTooLong {
                len: self.display_name.len(),
                max: MAX_NAME_LENGTH,
            });
        }
        if self.digs == 0 {
            return Err(SubmissionInvariantError::NoDigs);
        }
        Ok(())
    }
}

/// One leaderboard row as served to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub rank: u32,
    pub player_id: String,
    pub display_name: String,
    pub score: u64,
    pub digs: u32,
    pub outcome: FinalOutcome,
    pub submitted_at_ms: u64,
}
