// Per-player weekly acquisition.
//
// Each player is probed week by week starting at week 1. A week comes from
// the cache when it has been settled on an earlier run, otherwise from the
// fetcher. Probing stops at the first week without graded picks, or at the
// first week that still has games in progress or not yet started, so a
// partially played week is never followed by another.

use futures_util::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::cache::WeekCache;
use crate::error::AcquisitionError;
use crate::fetch::WeekFetcher;
use crate::model::{Player, RosterEntry, SeasonRules, WeekRecord, WeekTally};

/// Where a player's acquisition currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    /// About to look up this week.
    Probing(u32),
    /// A week with graded picks was appended. `settled` is false when some
    /// of that week's games were still pending.
    Recorded { week: u32, settled: bool },
    /// No further weeks will be probed.
    Stopped,
}

/// A single week's data and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Observation {
    tally: WeekTally,
    has_incomplete_games: bool,
    from_cache: bool,
}

/// Cache and fetch counts for one player, logged when acquisition ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquisitionStats {
    pub cache_hits: u32,
    pub fetches: u32,
}

/// Acquire every completed week for one player.
///
/// Fetch failures are not retried and abort this player's acquisition.
/// Cache failures are logged and otherwise ignored: a failed read falls back
/// to fetching and a failed write means the week is fetched again next run.
pub async fn acquire_player<F, C>(
    entry: &RosterEntry,
    fetcher: &F,
    cache: &C,
    rules: &SeasonRules,
) -> Result<Player, AcquisitionError>
where
    F: WeekFetcher + ?Sized,
    C: WeekCache + ?Sized,
{
    let mut weeks = Vec::new();
    let mut stats = AcquisitionStats::default();
    let mut state = AcquisitionState::Probing(1);

    loop {
        state = match state {
            AcquisitionState::Probing(week) => {
                let seen = observe_week(entry, week, fetcher, cache, &mut stats).await?;

                if !seen.from_cache && !seen.has_incomplete_games {
                    if let Err(e) = cache.set(&entry.name, week, seen.tally) {
                        warn!(player = %entry.name, week, error = %e, "cache write failed");
                    }
                }

                if seen.tally.has_completed_games() {
                    let record = WeekRecord::new(week, seen.tally, rules);
                    debug!(player = %entry.name, week, points = record.points, "week recorded");
                    weeks.push(record);
                    AcquisitionState::Recorded {
                        week,
                        settled: !seen.has_incomplete_games,
                    }
                } else {
                    AcquisitionState::Stopped
                }
            }
            AcquisitionState::Recorded { week, settled } => {
                if settled && week < rules.max_weeks {
                    AcquisitionState::Probing(week + 1)
                } else {
                    AcquisitionState::Stopped
                }
            }
            AcquisitionState::Stopped => break,
        };
    }

    info!(
        player = %entry.name,
        weeks = weeks.len(),
        cache_hits = stats.cache_hits,
        fetches = stats.fetches,
        "acquisition finished"
    );

    Ok(Player {
        name: entry.name.clone(),
        picks_locator: entry.picks_locator.clone(),
        weeks,
    })
}

/// Resolve one week from the cache, falling back to the fetcher.
async fn observe_week<F, C>(
    entry: &RosterEntry,
    week: u32,
    fetcher: &F,
    cache: &C,
    stats: &mut AcquisitionStats,
) -> Result<Observation, AcquisitionError>
where
    F: WeekFetcher + ?Sized,
    C: WeekCache + ?Sized,
{
    match cache.get(&entry.name, week) {
        Ok(Some(tally)) => {
            stats.cache_hits += 1;
            return Ok(Observation {
                tally,
                has_incomplete_games: false,
                from_cache: true,
            });
        }
        Ok(None) => {}
        Err(e) => {
            warn!(player = %entry.name, week, error = %e, "cache read failed, fetching instead");
        }
    }

    stats.fetches += 1;
    let report = fetcher
        .fetch_week(&entry.picks_locator, week)
        .await
        .map_err(|source| AcquisitionError::Fetch {
            player: entry.name.clone(),
            week,
            source,
        })?;

    Ok(Observation {
        tally: report.tally,
        has_incomplete_games: report.has_incomplete_games,
        from_cache: false,
    })
}

/// Acquire every player on the roster, at most `concurrency` players at a
/// time. Results keep roster order and `on_player` sees each finished player
/// in that order.
///
/// A failure for one player does not cancel the others; every player runs to
/// completion and the first failure (in roster order) is returned.
pub async fn acquire_all<F, C>(
    roster: &[RosterEntry],
    fetcher: &F,
    cache: &C,
    rules: &SeasonRules,
    concurrency: usize,
    mut on_player: impl FnMut(&Player),
) -> Result<Vec<Player>, AcquisitionError>
where
    F: WeekFetcher + ?Sized,
    C: WeekCache + ?Sized,
{
    let mut results = stream::iter(roster)
        .map(|entry| acquire_player(entry, fetcher, cache, rules))
        .buffered(concurrency.max(1));

    let mut players = Vec::with_capacity(roster.len());
    let mut first_error = None;

    while let Some(result) = results.next().await {
        match result {
            Ok(player) => {
                on_player(&player);
                players.push(player);
            }
            Err(e) => {
                error!(error = %e, "player acquisition failed");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(players),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::error::{CacheError, FetchError};
    use crate::model::WeekReport;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted fetcher: per-locator list of weekly reports, index 0 = week 1.
    /// Weeks past the end of the script report no graded picks.
    #[derive(Default)]
    struct ScriptedFetcher {
        weeks: HashMap<String, Vec<WeekReport>>,
        failing: HashMap<String, u32>,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl ScriptedFetcher {
        fn with(mut self, locator: &str, weeks: Vec<WeekReport>) -> Self {
            self.weeks.insert(locator.to_string(), weeks);
            self
        }

        fn failing_at(mut self, locator: &str, week: u32) -> Self {
            self.failing.insert(locator.to_string(), week);
            self
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeekFetcher for ScriptedFetcher {
        async fn fetch_week(&self, locator: &str, week: u32) -> Result<WeekReport, FetchError> {
            self.calls.lock().unwrap().push((locator.to_string(), week));
            if self.failing.get(locator) == Some(&week) {
                return Err(FetchError::Status {
                    url: format!("{locator}&week={week}"),
                    status: 503,
                });
            }
            Ok(self
                .weeks
                .get(locator)
                .and_then(|w| w.get(week as usize - 1))
                .copied()
                .unwrap_or(WeekReport {
                    tally: WeekTally::default(),
                    has_incomplete_games: true,
                }))
        }
    }

    /// Cache whose reads and writes always fail.
    struct BrokenCache;

    impl WeekCache for BrokenCache {
        fn get(&self, player: &str, week: u32) -> Result<Option<WeekTally>, CacheError> {
            Err(CacheError::Read {
                player: player.to_string(),
                week,
                message: "disk on fire".into(),
            })
        }

        fn set(&self, player: &str, week: u32, _: WeekTally) -> Result<(), CacheError> {
            Err(CacheError::Write {
                player: player.to_string(),
                week,
                message: "disk on fire".into(),
            })
        }
    }

    fn settled(correct: u32, incorrect: u32) -> WeekReport {
        WeekReport {
            tally: WeekTally::new(correct, incorrect),
            has_incomplete_games: false,
        }
    }

    fn in_progress(correct: u32, incorrect: u32) -> WeekReport {
        WeekReport {
            tally: WeekTally::new(correct, incorrect),
            has_incomplete_games: true,
        }
    }

    fn alice() -> RosterEntry {
        RosterEntry::new("Alice", "alice")
    }

    // ------------------------------------------------------------------
    // Stopping rules
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn stops_at_first_week_without_graded_picks() {
        let fetcher =
            ScriptedFetcher::default().with("alice", vec![settled(10, 6), settled(9, 7), settled(0, 0)]);
        let cache = MemoryCache::new();

        let player = acquire_player(&alice(), &fetcher, &cache, &SeasonRules::default())
            .await
            .unwrap();

        assert_eq!(player.weeks.len(), 2);
        assert_eq!(player.weeks[0].week, 1);
        assert_eq!(player.weeks[1].week, 2);
        assert_eq!(player.weeks[1].points, 9);
        assert_eq!(fetcher.calls().len(), 3);
    }

    #[tokio::test]
    async fn partially_played_week_is_recorded_then_stops() {
        let fetcher = ScriptedFetcher::default().with(
            "alice",
            vec![settled(10, 6), in_progress(4, 2), settled(11, 5)],
        );
        let cache = MemoryCache::new();

        let player = acquire_player(&alice(), &fetcher, &cache, &SeasonRules::default())
            .await
            .unwrap();

        assert_eq!(player.weeks.len(), 2);
        assert_eq!(player.weeks[1].correct, 4);
        // Week 3 must never be probed.
        assert_eq!(fetcher.calls(), vec![("alice".into(), 1), ("alice".into(), 2)]);
    }

    #[tokio::test]
    async fn unstarted_week_records_nothing() {
        let fetcher = ScriptedFetcher::default().with("alice", vec![in_progress(0, 0)]);
        let cache = MemoryCache::new();

        let player = acquire_player(&alice(), &fetcher, &cache, &SeasonRules::default())
            .await
            .unwrap();

        assert!(player.weeks.is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn max_weeks_caps_probing() {
        let fetcher = ScriptedFetcher::default().with("alice", vec![settled(5, 5); 10]);
        let cache = MemoryCache::new();
        let rules = SeasonRules {
            regular_season_weeks: 17,
            max_weeks: 3,
        };

        let player = acquire_player(&alice(), &fetcher, &cache, &rules).await.unwrap();

        assert_eq!(player.weeks.len(), 3);
        assert_eq!(fetcher.calls().len(), 3);
    }

    #[tokio::test]
    async fn postseason_weeks_are_recorded_with_zero_points() {
        let mut script = vec![settled(8, 8); 17];
        script.push(settled(12, 1));
        let fetcher = ScriptedFetcher::default().with("alice", script);
        let cache = MemoryCache::new();

        let player = acquire_player(&alice(), &fetcher, &cache, &SeasonRules::default())
            .await
            .unwrap();

        assert_eq!(player.weeks.len(), 18);
        assert_eq!(player.weeks[16].points, 8);
        assert_eq!(player.weeks[17].correct, 12);
        assert_eq!(player.weeks[17].points, 0);
    }

    // ------------------------------------------------------------------
    // Cache behaviour
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn only_settled_fetched_weeks_are_written_back() {
        let fetcher = ScriptedFetcher::default().with(
            "alice",
            vec![settled(10, 6), settled(9, 7), in_progress(3, 1)],
        );
        let cache = MemoryCache::new();

        acquire_player(&alice(), &fetcher, &cache, &SeasonRules::default())
            .await
            .unwrap();

        assert_eq!(cache.get("Alice", 1).unwrap(), Some(WeekTally::new(10, 6)));
        assert_eq!(cache.get("Alice", 2).unwrap(), Some(WeekTally::new(9, 7)));
        assert_eq!(cache.get("Alice", 3).unwrap(), None);
    }

    #[tokio::test]
    async fn cache_hits_skip_the_fetcher() {
        let cache = MemoryCache::new();
        cache.set("Alice", 1, WeekTally::new(10, 6)).unwrap();
        cache.set("Alice", 2, WeekTally::new(9, 7)).unwrap();
        let fetcher = ScriptedFetcher::default().with(
            "alice",
            vec![settled(0, 0), settled(0, 0), in_progress(2, 0)],
        );

        let player = acquire_player(&alice(), &fetcher, &cache, &SeasonRules::default())
            .await
            .unwrap();

        assert_eq!(player.weeks.len(), 3);
        assert_eq!(player.weeks[0].correct, 10);
        assert_eq!(player.weeks[1].correct, 9);
        assert_eq!(fetcher.calls(), vec![("alice".into(), 3)]);
    }

    #[tokio::test]
    async fn cached_empty_week_stops_without_fetching() {
        let cache = MemoryCache::new();
        cache.set("Alice", 1, WeekTally::new(0, 0)).unwrap();
        let fetcher = ScriptedFetcher::default().with("alice", vec![settled(10, 6)]);

        let player = acquire_player(&alice(), &fetcher, &cache, &SeasonRules::default())
            .await
            .unwrap();

        assert!(player.weeks.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn broken_cache_falls_back_to_fetching() {
        let fetcher = ScriptedFetcher::default().with("alice", vec![settled(10, 6), settled(0, 0)]);

        let player = acquire_player(&alice(), &fetcher, &BrokenCache, &SeasonRules::default())
            .await
            .unwrap();

        assert_eq!(player.weeks.len(), 1);
        assert_eq!(fetcher.calls().len(), 2);
    }

    // ------------------------------------------------------------------
    // Failures and multiple players
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn fetch_failure_aborts_the_player() {
        let fetcher = ScriptedFetcher::default()
            .with("alice", vec![settled(10, 6), settled(9, 7)])
            .failing_at("alice", 2);
        let cache = MemoryCache::new();

        let err = acquire_player(&alice(), &fetcher, &cache, &SeasonRules::default())
            .await
            .unwrap_err();

        match err {
            AcquisitionError::Fetch { player, week, .. } => {
                assert_eq!(player, "Alice");
                assert_eq!(week, 2);
            }
        }
        // Week 1 was settled before the failure and stays cached.
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn acquire_all_keeps_roster_order() {
        let fetcher = ScriptedFetcher::default()
            .with("a", vec![settled(1, 1)])
            .with("b", vec![settled(2, 2)])
            .with("c", vec![settled(3, 3)]);
        let cache = MemoryCache::new();
        let roster = vec![
            RosterEntry::new("A", "a"),
            RosterEntry::new("B", "b"),
            RosterEntry::new("C", "c"),
        ];

        let mut seen = Vec::new();
        let players = acquire_all(&roster, &fetcher, &cache, &SeasonRules::default(), 3, |p| {
            seen.push(p.name.clone())
        })
        .await
        .unwrap();

        let names: Vec<_> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(seen, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_other_players() {
        let fetcher = ScriptedFetcher::default()
            .with("a", vec![settled(1, 1)])
            .failing_at("b", 1)
            .with("c", vec![settled(3, 3)]);
        let cache = MemoryCache::new();
        let roster = vec![
            RosterEntry::new("A", "a"),
            RosterEntry::new("B", "b"),
            RosterEntry::new("C", "c"),
        ];

        let mut seen = Vec::new();
        let err = acquire_all(&roster, &fetcher, &cache, &SeasonRules::default(), 1, |p| {
            seen.push(p.name.clone())
        })
        .await
        .unwrap_err();

        assert!(err.to_string().contains("for B"));
        assert_eq!(seen, vec!["A", "C"]);
        assert_eq!(cache.get("C", 1).unwrap(), Some(WeekTally::new(3, 3)));
    }
}
