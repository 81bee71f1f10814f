// SQLite persistence for settled week tallies.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Correct and incorrect pick counts stored for one player's settled week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredTally {
    pub correct: u32,
    pub incorrect: u32,
}

/// SQLite-backed key-value store of week tallies keyed by
/// `(player_name, week)`. Rows are never expired.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests). Missing parent directories are created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && path != Path::new(":memory:") {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS week_cache (
                player_name TEXT    NOT NULL,
                week        INTEGER NOT NULL,
                correct     INTEGER NOT NULL,
                incorrect   INTEGER NOT NULL,
                recorded_at TEXT    NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (player_name, week)
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection. A poisoned mutex (another thread
    /// panicked while holding the lock) is an error, not a panic.
    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))
    }

    /// Load the tally stored for `(player_name, week)`, if any.
    pub fn load_week(&self, player_name: &str, week: u32) -> Result<Option<StoredTally>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT correct, incorrect FROM week_cache
                 WHERE player_name = ?1 AND week = ?2",
                params![player_name, week],
                |row| {
                    Ok(StoredTally {
                        correct: row.get(0)?,
                        incorrect: row.get(1)?,
                    })
                },
            )
            .optional()
            .with_context(|| format!("failed to load week {week} for {player_name}"))?;
        Ok(row)
    }

    /// Persist a tally under `(player_name, week)`. Uses INSERT OR REPLACE so
    /// re-saving a week overwrites the previous value.
    pub fn save_week(&self, player_name: &str, week: u32, tally: StoredTally) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO week_cache (player_name, week, correct, incorrect)
             VALUES (?1, ?2, ?3, ?4)",
            params![player_name, week, tally.correct, tally.incorrect],
        )
        .with_context(|| format!("failed to save week {week} for {player_name}"))?;
        Ok(())
    }

    /// Number of cached weeks across all players.
    pub fn cached_week_count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM week_cache", [], |row| row.get(0))
            .context("failed to count cached weeks")?;
        Ok(count as usize)
    }
}
