/// Bust probability on the very first dig.
pub const BUST_BASE_CHANCE: f64 = 0.05;

/// Added to the bust probability per dig already taken.
pub const BUST_INCREMENT: f64 = 0.002;

/// Probability of finding a gem when the dig neither jackpots nor busts.
pub const GEM_CHANCE: f64 = 0.30;

/// Inclusive gem reward bounds.
pub const GEM_MIN_POINTS: u64 = 5;
pub const GEM_MAX_POINTS: u64 = 25;

/// Minimum digs before the jackpot becomes possible.
pub const JACKPOT_THRESHOLD: u32 = 30;

/// Jackpot probability ramp after the threshold, capped.
pub const JACKPOT_BASE_CHANCE: f64 = 0.02;
pub const JACKPOT_INCREMENT: f64 = 0.01;
pub const JACKPOT_MAX_CHANCE: f64 = 0.50;

/// Fixed reward for hitting the jackpot.
pub const JACKPOT_BONUS: u64 = 500;

/// Minimum interval between score submissions (anti-spam).
pub const SUBMIT_COOLDOWN_MS: u64 = 5_000;

/// Pacing delay between a dig request and its evaluation.
pub const DIG_DELAY_MS: u64 = 300;

/// Maximum name length accepted in submission records.
pub const MAX_NAME_LENGTH: usize = 32;

/// Default number of rows returned by leaderboard queries.
pub const LEADERBOARD_DEFAULT_LIMIT: usize = 50;

/// Upper bound on rows a leaderboard query may return, regardless of the
/// requested limit.
pub const LEADERBOARD_MAX_LIMIT: usize = 100;
