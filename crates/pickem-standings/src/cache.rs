// Week cache: settled tallies keyed by (player name, week number).

use std::collections::HashMap;
use std::sync::Mutex;

use pickem_core::db::{Database, StoredTally};

use crate::error::CacheError;
use crate::model::WeekTally;

/// Persistent store of week tallies that will not change any more.
pub trait WeekCache: Send + Sync {
    fn get(&self, player_name: &str, week: u32) -> Result<Option<WeekTally>, CacheError>;

    fn set(&self, player_name: &str, week: u32, tally: WeekTally) -> Result<(), CacheError>;
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

impl WeekCache for Database {
    fn get(&self, player_name: &str, week: u32) -> Result<Option<WeekTally>, CacheError> {
        self.load_week(player_name, week)
            .map(|row| row.map(|t| WeekTally::new(t.correct, t.incorrect)))
            .map_err(|e| CacheError::Read {
                player: player_name.to_string(),
                week,
                message: format!("{e:#}"),
            })
    }

    fn set(&self, player_name: &str, week: u32, tally: WeekTally) -> Result<(), CacheError> {
        let stored = StoredTally {
            correct: tally.correct,
            incorrect: tally.incorrect,
        };
        self.save_week(player_name, week, stored)
            .map_err(|e| CacheError::Write {
                player: player_name.to_string(),
                week,
                message: format!("{e:#}"),
            })
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local cache. Used by tests and by runs that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<(String, u32), WeekTally>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WeekCache for MemoryCache {
    fn get(&self, player_name: &str, week: u32) -> Result<Option<WeekTally>, CacheError> {
        let entries = self.entries.lock().map_err(|_| CacheError::Read {
            player: player_name.to_string(),
            week,
            message: "cache mutex poisoned".into(),
        })?;
        Ok(entries.get(&(player_name.to_string(), week)).copied())
    }

    fn set(&self, player_name: &str, week: u32, tally: WeekTally) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Write {
            player: player_name.to_string(),
            week,
            message: "cache mutex poisoned".into(),
        })?;
        entries.insert((player_name.to_string(), week), tally);
        Ok(())
    }
}
