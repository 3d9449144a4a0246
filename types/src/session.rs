use serde::{Deserialize, Serialize};

/// Classification of a single dig.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigOutcome {
    /// Nothing found; the session continues.
    Dirt,
    /// Small variable reward; the session continues.
    Gem,
    /// Terminal failure; no additional reward.
    Bust,
    /// Terminal success; large fixed bonus.
    Jackpot,
}

/// Session lifecycle state. `Playing` is the only non-terminal variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Playing,
    Busted,
    Jackpot,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Playing)
    }
}

/// One play-through of the digging game.
///
/// Created fresh for every "play again"; once terminal it is never mutated,
/// only replaced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Cumulative points earned this session.
    pub score: u64,
    /// Digs taken so far.
    pub digs: u32,
    pub status: SessionStatus,
    /// Classification of the most recent dig, for display.
    pub last_outcome: Option<DigOutcome>,
    /// Points from the most recent dig.
    pub last_points: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            score: 0,
            digs: 0,
            status: SessionStatus::Playing,
            last_outcome: None,
            last_points: 0,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Display contract consumed by presentation layers.
///
/// `progress` and `message` are display heuristics only; they have no effect
/// on outcome probabilities and must not be read as the authoritative risk
/// level.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionView {
    pub score: u64,
    pub digs: u32,
    pub status: SessionStatus,
    pub last_outcome: Option<DigOutcome>,
    pub last_points: u64,
    /// Progress toward the diamond wall, 0-100.
    pub progress: f64,
    /// Tiered motivational message derived from `progress`.
    pub message: &'static str,
}
