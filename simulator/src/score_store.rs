//! Sqlite persistence for submitted scores and local stats.
//!
//! Writes flow through a bounded channel to a dedicated worker thread so the
//! gameplay path never blocks on disk; a full queue drops the write with a
//! warning, matching the fire-and-forget submission contract. Reads go
//! through a separate mutexed connection.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use digbust_execution::{LocalStats, ScoreSink, SinkError, StatsError, StatsStore};
use digbust_types::{FinalOutcome, ScoreRow, SubmissionRecord};
use rusqlite::{params, Connection, OpenFlags};
use tracing::{error, warn};

const WRITE_QUEUE_DEPTH: usize = 256;
const MS_PER_DAY: u64 = 24 * 60 * 60 * 1_000;

/// Leaderboard time window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Window {
    AllTime,
    Today,
}

impl Window {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "alltime" => Some(Window::AllTime),
            "today" => Some(Window::Today),
            _ => None,
        }
    }
}

enum PersistRequest {
    Score(SubmissionRecord),
    Stats { player_id: String, stats: LocalStats },
    Flush(SyncSender<()>),
}

pub struct ScoreStore {
    sender: SyncSender<PersistRequest>,
    reader: Arc<Mutex<Connection>>,
}

/// Cloneable write handle implementing the execution-layer collaborator
/// traits. Sends never block; a full queue surfaces as a downstream error.
#[derive(Clone)]
pub struct StoreHandle {
    sender: SyncSender<PersistRequest>,
    reader: Arc<Mutex<Connection>>,
}

impl ScoreStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let reader = Connection::open(path).context("open score db (reader)")?;
        let writer = Connection::open(path).context("open score db (writer)")?;
        Self::start(reader, writer)
    }

    /// Shared-cache in-memory database, one namespace per store. Used by
    /// tests and when the service runs without a `--db` path.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        static NAMESPACE: AtomicU64 = AtomicU64::new(0);
        let uri = format!(
            "file:digbust_mem_{}?mode=memory&cache=shared",
            NAMESPACE.fetch_add(1, Ordering::Relaxed)
        );
        let flags = OpenFlags::default() | OpenFlags::SQLITE_OPEN_URI;
        let reader =
            Connection::open_with_flags(&uri, flags).context("open in-memory score db")?;
        let writer =
            Connection::open_with_flags(&uri, flags).context("open in-memory score db")?;
        Self::start(reader, writer)
    }

    fn start(reader: Connection, writer: Connection) -> anyhow::Result<Self> {
        init_schema(&reader)?;
        let (sender, receiver) = sync_channel(WRITE_QUEUE_DEPTH);
        std::thread::spawn(move || persistence_worker(writer, receiver));
        Ok(Self {
            sender,
            reader: Arc::new(Mutex::new(reader)),
        })
    }

    pub fn sink(&self) -> StoreHandle {
        StoreHandle {
            sender: self.sender.clone(),
            reader: Arc::clone(&self.reader),
        }
    }

    pub fn stats_store(&self) -> StoreHandle {
        self.sink()
    }

    /// Block until every previously queued write has been applied.
    pub fn flush(&self) {
        let (ack, done) = sync_channel(1);
        if self.sender.send(PersistRequest::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }

    pub fn top_scores(
        &self,
        window: Window,
        limit: usize,
        now_ms: u64,
    ) -> anyhow::Result<Vec<ScoreRow>> {
        let since_ms = match window {
            Window::AllTime => 0,
            Window::Today => now_ms - now_ms % MS_PER_DAY,
        };
        let reader = self.reader.lock().expect("reader lock poisoned");
        let mut stmt = reader.prepare(
            "SELECT player_id, display_name, score, digs, outcome, submitted_at_ms
             FROM scores WHERE submitted_at_ms >= ?1
             ORDER BY score DESC, submitted_at_ms ASC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![since_ms, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (player_id, display_name, score, digs, outcome, submitted_at_ms) = row?;
            let outcome = FinalOutcome::parse(&outcome)
                .with_context(|| format!("unknown outcome in scores table: {outcome}"))?;
            entries.push(ScoreRow {
                rank: entries.len() as u32 + 1,
                player_id,
                display_name,
                score: score as u64,
                digs: digs as u32,
                outcome,
                submitted_at_ms: submitted_at_ms as u64,
            });
        }
        Ok(entries)
    }
}

impl StoreHandle {
    fn try_send(&self, request: PersistRequest, what: &'static str) -> Result<(), SinkError> {
        use std::sync::mpsc::TrySendError;
        match self.sender.try_send(request) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(what, "score persistence queue full; dropping write");
                Err(SinkError::Unavailable("persistence queue full"))
            }
            Err(TrySendError::Disconnected(_)) => {
                error!(what, "score persistence worker gone");
                Err(SinkError::Unavailable("persistence worker stopped"))
            }
        }
    }
}

impl ScoreSink for StoreHandle {
    fn record(&mut self, record: &SubmissionRecord) -> Result<(), SinkError> {
        if let Err(err) = record.validate_invariants() {
            warn!(player = %record.player_id, %err, "invalid submission record dropped");
            return Err(SinkError::Rejected(err.to_string()));
        }
        self.try_send(PersistRequest::Score(record.clone()), "score")
    }
}

impl StatsStore for StoreHandle {
    fn load(&self, player_id: &str) -> Result<LocalStats, StatsError> {
        let reader = self.reader.lock().expect("reader lock poisoned");
        let result = reader.query_row(
            "SELECT best_score, total_attempts FROM local_stats WHERE player_id = ?1",
            params![player_id],
            |row| {
                Ok(LocalStats {
                    best_score: row.get::<_, i64>(0)? as u64,
                    total_attempts: row.get::<_, i64>(1)? as u64,
                })
            },
        );
        match result {
            Ok(stats) => Ok(stats),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(LocalStats::default()),
            Err(err) => Err(StatsError::Unavailable(err.to_string())),
        }
    }

    fn store(&mut self, player_id: &str, stats: &LocalStats) -> Result<(), StatsError> {
        self.try_send(
            PersistRequest::Stats {
                player_id: player_id.to_string(),
                stats: *stats,
            },
            "stats",
        )
        .map_err(|err| StatsError::Unavailable(err.to_string()))
    }
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA synchronous=NORMAL;
         CREATE TABLE IF NOT EXISTS scores (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             player_id TEXT NOT NULL,
             display_name TEXT NOT NULL,
             score INTEGER NOT NULL,
             digs INTEGER NOT NULL,
             outcome TEXT NOT NULL,
             submitted_at_ms INTEGER NOT NULL
         );
         CREATE INDEX IF NOT EXISTS scores_by_score ON scores(score DESC, submitted_at_ms ASC);
         CREATE TABLE IF NOT EXISTS local_stats (
             player_id TEXT PRIMARY KEY,
             best_score INTEGER NOT NULL,
             total_attempts INTEGER NOT NULL
         );",
    )
    .context("init score store schema")?;
    Ok(())
}

fn persistence_worker(conn: Connection, receiver: Receiver<PersistRequest>) {
    while let Ok(request) = receiver.recv() {
        match request {
            PersistRequest::Score(record) => {
                let result = conn.execute(
                    "INSERT INTO scores
                     (player_id, display_name, score, digs, outcome, submitted_at_ms)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        record.player_id,
                        record.display_name,
                        record.score as i64,
                        record.digs as i64,
                        record.outcome.as_str(),
                        record.submitted_at_ms as i64,
                    ],
                );
                if let Err(err) = result {
                    error!(%err, player = %record.player_id, "score insert failed");
                }
            }
            PersistRequest::Stats { player_id, stats } => {
                let result = conn.execute(
                    "INSERT INTO local_stats (player_id, best_score, total_attempts)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(player_id) DO UPDATE SET
                         best_score = excluded.best_score,
                         total_attempts = excluded.total_attempts",
                    params![
                        player_id,
                        stats.best_score as i64,
                        stats.total_attempts as i64,
                    ],
                );
                if let Err(err) = result {
                    error!(%err, player = %player_id, "stats upsert failed");
                }
            }
            PersistRequest::Flush(ack) => {
                let _ = ack.try_send(());
            }
        }
    }
}
