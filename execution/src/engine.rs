//! Dig outcome engine.
//!
//! Pure probability model: given the number of digs already taken, classify
//! the next dig as dirt, gem, bust, or jackpot and price its reward. The
//! checks run in a strict order against three independent draws:
//!
//! 1. Jackpot (only once the threshold is reached). Checked first: once
//!    unlocked, it can preempt a bust on the same dig.
//! 2. Bust: `bust_base_chance + digs_so_far * bust_increment`, uncapped.
//!    The dig count used is the count *before* this dig's increment.
//! 3. Gem: fixed chance, uniform integer reward in the configured bounds.
//!
//! Falling through all three yields dirt.

use digbust_types::{DigOutcome, GameConfig};

use crate::rng::UnitRng;

/// Outcome classification plus reward for one dig.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub outcome: DigOutcome,
    pub points: u64,
}

/// Jackpot probability for a given dig count, zero below the threshold.
pub fn jackpot_chance(digs_so_far: u32, config: &GameConfig) -> f64 {
    if digs_so_far < config.jackpot_threshold {
        return 0.0;
    }
    let over = (digs_so_far - config.jackpot_threshold) as f64;
    (config.jackpot_base_chance + over * config.jackpot_increment)
        .min(config.jackpot_max_chance)
}

/// Bust probability for a given dig count (pre-increment convention).
pub fn bust_chance(digs_so_far: u32, config: &GameConfig) -> f64 {
    config.bust_base_chance + digs_so_far as f64 * config.bust_increment
}

/// Classify the next dig. Total over its domain; the only effect is the
/// draws consumed from `rng`.
pub fn decide(digs_so_far: u32, config: &GameConfig, rng: &mut impl UnitRng) -> Decision {
    if digs_so_far >= config.jackpot_threshold
        && rng.next_unit() < jackpot_chance(digs_so_far, config)
    {
        return Decision {
            outcome: DigOutcome::Jackpot,
            points: config.jackpot_bonus,
        };
    }

    if rng.next_unit() < bust_chance(digs_so_far, config) {
        return Decision {
            outcome: DigOutcome::Bust,
            points: 0,
        };
    }

    if rng.next_unit() < config.gem_chance {
        return Decision {
            outcome: DigOutcome::Gem,
            points: gem_points(config, rng),
        };
    }

    Decision {
        outcome: DigOutcome::Dirt,
        points: 0,
    }
}

/// Uniform integer in `[gem_min_points, gem_max_points]` inclusive, derived
/// from one unit draw by floor (matches the span+floor arithmetic the
/// balancing was tuned against).
fn gem_points(config: &GameConfig, rng: &mut impl UnitRng) -> u64 {
    let span = config.gem_max_points - config.gem_min_points + 1;
    config.gem_min_points + (rng.next_unit() * span as f64) as u64
}
