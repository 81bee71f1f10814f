// Seams to the pick'em site: the group roster and per-week pick pages.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::model::{RosterEntry, WeekReport};

/// Lists the members of a pick'em group.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn roster(&self, group_id: &str) -> Result<Vec<RosterEntry>, FetchError>;
}

/// Reads one player's graded picks for one week.
#[async_trait]
pub trait WeekFetcher: Send + Sync {
    async fn fetch_week(&self, picks_locator: &str, week: u32) -> Result<WeekReport, FetchError>;
}
