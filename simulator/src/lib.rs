//! Local backend for digbust.
//!
//! Hosts the game tables behind an HTTP API and plays the role of the
//! score-persistence collaborator: submitted scores land in sqlite and feed
//! the leaderboard. One table per player id, created on first contact.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use digbust_execution::{
    DigReport, DigRng, DigTable, GameError, LocalStats, PlayerIdentity, StatsStore,
};
use digbust_types::{GameConfig, ScoreRow, SessionView, LEADERBOARD_MAX_LIMIT, MAX_NAME_LENGTH};

mod api;
pub use api::Api;

mod score_store;
pub use score_store::{ScoreStore, Window};

/// Runtime configuration assembled from CLI flags.
#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    pub game: GameConfig,
    /// Seed for the deterministic per-dig RNG streams.
    pub seed: u64,
    /// Per-IP request limit on the dig route; `None` disables the layer.
    pub dig_rate_limit_per_second: Option<u64>,
    pub dig_rate_limit_burst: Option<u32>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            seed: 0,
            dig_rate_limit_per_second: None,
            dig_rate_limit_burst: None,
        }
    }
}

pub struct Simulator {
    pub config: SimulatorConfig,
    store: Arc<ScoreStore>,
    tables: Mutex<HashMap<String, DigTable>>,
}

/// Current table state plus persistent counters, as served to clients.
#[derive(Clone, Debug, serde::Serialize)]
pub struct TableSnapshot {
    pub view: SessionView,
    pub best_score: u64,
    pub total_attempts: u64,
}

impl Simulator {
    pub fn new(config: SimulatorConfig, store: Arc<ScoreStore>) -> anyhow::Result<Self> {
        config.game.validate()?;
        Ok(Self {
            config,
            store,
            tables: Mutex::new(HashMap::new()),
        })
    }

    /// Milliseconds since the UNIX epoch; the timestamp written into
    /// submission records and fed to the cooldown gate.
    pub fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Evaluate one dig for `player`. Randomness is drawn here, at
    /// evaluation time; any pacing delay happens before this call.
    pub fn dig(&self, player_id: &str) -> Result<DigReport, GameError> {
        let mut tables = self.tables.lock().expect("tables lock poisoned");
        let table = self.table_entry(&mut tables, player_id);
        let mut rng = DigRng::new(
            self.config.seed ^ hash_player(player_id),
            table.session_nonce(),
            table.session().digs,
        );
        let mut sink = self.store.sink();
        let mut stats_store = self.store.stats_store();
        table.dig(Self::now_ms(), &mut rng, &mut sink, &mut stats_store)
    }

    /// Replace a player's session ("play again"). Creating the table on
    /// demand makes this a no-op for first-time players.
    pub fn reset(&self, player_id: &str) -> TableSnapshot {
        let mut tables = self.tables.lock().expect("tables lock poisoned");
        let table = self.table_entry(&mut tables, player_id);
        table.play_again();
        snapshot(table)
    }

    pub fn table(&self, player_id: &str) -> TableSnapshot {
        let mut tables = self.tables.lock().expect("tables lock poisoned");
        snapshot(self.table_entry(&mut tables, player_id))
    }

    pub fn leaderboard(&self, window: Window, limit: usize) -> anyhow::Result<Vec<ScoreRow>> {
        // Clamp before the value reaches SQL; an unbounded limit would dump
        // the whole table (and usize::MAX casts to LIMIT -1).
        self.store
            .top_scores(window, limit.min(LEADERBOARD_MAX_LIMIT), Self::now_ms())
    }

    fn table_entry<'t>(
        &self,
        tables: &'t mut HashMap<String, DigTable>,
        player_id: &str,
    ) -> &'t mut DigTable {
        if !tables.contains_key(player_id) {
            let stats = self
                .store
                .stats_store()
                .load(player_id)
                .unwrap_or_else(|err| {
                    tracing::warn!(player = player_id, %err, "stats load failed; starting fresh");
                    LocalStats::default()
                });
            let identity = PlayerIdentity {
                player_id: player_id.to_string(),
                display_name: display_name_for(player_id),
            };
            // Config was validated in `new`; construction cannot fail here.
            let table = DigTable::new(self.config.game.clone(), identity, stats)
                .expect("validated config");
            tables.insert(player_id.to_string(), table);
        }
        tables.get_mut(player_id).expect("table just inserted")
    }
}

fn snapshot(table: &DigTable) -> TableSnapshot {
    let stats = table.stats();
    TableSnapshot {
        view: table.view(),
        best_score: stats.best_score,
        total_attempts: stats.total_attempts,
    }
}

fn hash_player(player_id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    player_id.hash(&mut hasher);
    hasher.finish()
}

/// Guests display as "Anonymous"; anything else doubles as the display name
/// until an identity layer exists, truncated to the submission name cap.
fn display_name_for(player_id: &str) -> String {
    if player_id.starts_with("anonymous_") {
        return "Anonymous".to_string();
    }
    let mut end = player_id.len().min(MAX_NAME_LENGTH);
    while !player_id.is_char_boundary(end) {
        end -= 1;
    }
    player_id[..end].to_string()
}
