// Players, week records, and the season scoring rule.

use std::fmt;

use pickem_core::config::SeasonConfig;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Acquisition-side types
// ---------------------------------------------------------------------------

/// A group member as listed on the group page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// Display name, unique within a run.
    pub name: String,
    /// Opaque reference the week fetcher uses to find this player's picks.
    pub picks_locator: String,
}

impl RosterEntry {
    pub fn new(name: impl Into<String>, picks_locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            picks_locator: picks_locator.into(),
        }
    }
}

/// Correct and incorrect pick counts for one player's week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeekTally {
    pub correct: u32,
    pub incorrect: u32,
}

impl WeekTally {
    pub fn new(correct: u32, incorrect: u32) -> Self {
        Self { correct, incorrect }
    }

    /// A week has results once at least one pick has been graded.
    pub fn has_completed_games(&self) -> bool {
        self.correct + self.incorrect > 0
    }
}

/// What the fetcher saw on a week's picks page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekReport {
    pub tally: WeekTally,
    /// True if any game that week is in progress or not yet started.
    pub has_incomplete_games: bool,
}

/// One completed week of a player's picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekRecord {
    /// 1-based week number.
    pub week: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// Standings points earned this week.
    pub points: u32,
}

impl WeekRecord {
    pub fn new(week: u32, tally: WeekTally, rules: &SeasonRules) -> Self {
        Self {
            week,
            correct: tally.correct,
            incorrect: tally.incorrect,
            points: rules.points_for(week, tally.correct),
        }
    }
}

/// A player with every completed week acquired so far. `weeks[0]` is week 1
/// and week numbers have no gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub picks_locator: String,
    pub weeks: Vec<WeekRecord>,
}

// ---------------------------------------------------------------------------
// Season rules
// ---------------------------------------------------------------------------

/// Scoring and probing limits for a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonRules {
    /// Weeks after this one are postseason and score nothing.
    pub regular_season_weeks: u32,
    /// Acquisition never probes past this week.
    pub max_weeks: u32,
}

impl SeasonRules {
    /// Points for a week: every correct pick counts during the regular
    /// season, nothing counts afterwards.
    pub fn points_for(&self, week: u32, correct: u32) -> u32 {
        if week <= self.regular_season_weeks {
            correct
        } else {
            0
        }
    }
}

impl Default for SeasonRules {
    fn default() -> Self {
        SeasonConfig::default().into()
    }
}

impl From<SeasonConfig> for SeasonRules {
    fn from(config: SeasonConfig) -> Self {
        Self {
            regular_season_weeks: config.regular_season_weeks,
            max_weeks: config.max_weeks,
        }
    }
}

// ---------------------------------------------------------------------------
// Ranked output
// ---------------------------------------------------------------------------

/// A week record annotated with cumulative points and both ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankedWeek {
    #[serde(flatten)]
    pub record: WeekRecord,
    pub overall_points: u32,
    pub overall_rank: u32,
    pub weekly_rank: u32,
}

/// Movement in overall rank since the previous week. Positive means the
/// player climbed. `None` when unchanged or when there is no previous week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RankChange(Option<i64>);

impl RankChange {
    pub fn between(previous_rank: u32, current_rank: u32) -> Self {
        let delta = i64::from(previous_rank) - i64::from(current_rank);
        Self((delta != 0).then_some(delta))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn delta(&self) -> Option<i64> {
        self.0
    }
}

impl fmt::Display for RankChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(delta) if delta > 0 => write!(f, "+{delta}"),
            Some(delta) => write!(f, "{delta}"),
            None => Ok(()),
        }
    }
}

/// A player's final-week summary plus the full ranked week history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub name: String,
    pub overall_rank: u32,
    pub overall_rank_change: RankChange,
    pub overall_points: u32,
    pub weekly_points: u32,
    pub weekly_rank: u32,
    pub weeks: Vec<RankedWeek>,
}
