// Error types for fetching, caching, acquisition, and ranking.

use thiserror::Error;

/// Failure at the boundary with the pick'em site.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("could not read {url}: {message}")]
    Parse { url: String, message: String },
}

/// Failure reading or writing the week cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache read failed for {player} week {week}: {message}")]
    Read {
        player: String,
        week: u32,
        message: String,
    },

    #[error("cache write failed for {player} week {week}: {message}")]
    Write {
        player: String,
        week: u32,
        message: String,
    },
}

/// A player's weeks could not be acquired. Fatal for the run.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("failed to fetch week {week} for {player}")]
    Fetch {
        player: String,
        week: u32,
        source: FetchError,
    },
}

/// The acquired data cannot be ranked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StandingsError {
    #[error(
        "invariant violation: {player} has {found} completed weeks but {expected} were expected"
    )]
    UnequalWeekCounts {
        player: String,
        expected: usize,
        found: usize,
    },

    #[error("no completed weeks to rank")]
    NoCompletedWeeks,
}
