use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// Game balancing configuration.
///
/// Immutable for the lifetime of a process. `Default` yields the shipped
/// balancing values; anything else must pass [`GameConfig::validate`] before
/// use so that bad probabilities surface at construction, never mid-session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Bust probability at dig 0.
    pub bust_base_chance: f64,
    /// Added to the bust probability per dig already taken.
    pub bust_increment: f64,
    /// Fixed gem probability when the dig neither jackpots nor busts.
    pub gem_chance: f64,
    /// Inclusive gem reward bounds.
    pub gem_min_points: u64,
    pub gem_max_points: u64,
    /// Digs required before the jackpot check runs at all.
    pub jackpot_threshold: u32,
    /// Jackpot probability ramp past the threshold, capped at
    /// `jackpot_max_chance`.
    pub jackpot_base_chance: f64,
    pub jackpot_increment: f64,
    pub jackpot_max_chance: f64,
    /// Fixed jackpot reward.
    pub jackpot_bonus: u64,
    /// Minimum interval between accepted score submissions.
    pub submit_cooldown_ms: u64,
    /// Pacing delay between a dig request and its evaluation. Display-only:
    /// randomness is drawn at evaluation time, never when the request lands.
    pub dig_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bust_base_chance: BUST_BASE_CHANCE,
            bust_increment: BUST_INCREMENT,
            gem_chance: GEM_CHANCE,
            gem_min_points: GEM_MIN_POINTS,
            gem_max_points: GEM_MAX_POINTS,
            jackpot_threshold: JACKPOT_THRESHOLD,
            jackpot_base_chance: JACKPOT_BASE_CHANCE,
            jackpot_increment: JACKPOT_INCREMENT,
            jackpot_max_chance: JACKPOT_MAX_CHANCE,
            jackpot_bonus: JACKPOT_BONUS,
            submit_cooldown_ms: SUBMIT_COOLDOWN_MS,
            dig_delay_ms: DIG_DELAY_MS,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} out of range (got={got}, expected within [0,1])")]
    ProbabilityOutOfRange { field: &'static str, got: f64 },
    #[error("gem bounds inverted (min={min}, max={max})")]
    GemBoundsInverted { min: u64, max: u64 },
    #[error("jackpot_max_chance ({max}) below jackpot_base_chance ({base})")]
    JackpotCapBelowBase { base: f64, max: f64 },
}

impl GameConfig {
    /// Validate configuration invariants.
    ///
    /// Note the bust ramp is deliberately uncapped: operators that configure
    /// it past 1.0 for reachable dig counts get a guaranteed bust, which is a
    /// legal (if harsh) table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("bust_base_chance", self.bust_base_chance),
            ("bust_increment", self.bust_increment),
            ("gem_chance", self.gem_chance),
            ("jackpot_base_chance", self.jackpot_base_chance),
            ("jackpot_increment", self.jackpot_increment),
            ("jackpot_max_chance", self.jackpot_max_chance),
        ];
        for (field, got) in probabilities {
            if !(0.0..=1.0).contains(&got) || got.is_nan() {
                return Err(ConfigError::ProbabilityOutOfRange { field, got });
            }
        }
        if self.gem_min_points > self.gem_max_points {
            return Err(ConfigError::GemBoundsInverted {
                min: self.gem_min_points,
                max: self.gem_max_points,
            });
        }
        if self.jackpot_max_chance < self.jackpot_base_chance {
            return Err(ConfigError::JackpotCapBelowBase {
                base: self.jackpot_base_chance,
                max: self.jackpot_max_chance,
            });
        }
        Ok(())
    }
}
