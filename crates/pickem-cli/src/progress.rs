// Per-player progress printed while weeks are acquired.

use std::fmt::Write;

use pickem_standings::model::Player;

/// The player's name, an `=` underline of the same width, one
/// `Week N: points` line per recorded week, then a blank line.
pub fn player_block(player: &Player) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", player.name);
    let _ = writeln!(out, "{}", "=".repeat(player.name.chars().count()));
    for week in &player.weeks {
        let _ = writeln!(out, "Week {}: {}", week.week, week.points);
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickem_standings::model::{SeasonRules, WeekRecord, WeekTally};

    #[test]
    fn block_lists_each_week() {
        let rules = SeasonRules::default();
        let player = Player {
            name: "Zoë".into(),
            picks_locator: "x".into(),
            weeks: vec![
                WeekRecord::new(1, WeekTally::new(10, 6), &rules),
                WeekRecord::new(18, WeekTally::new(3, 1), &rules),
            ],
        };

        assert_eq!(player_block(&player), "Zoë\n===\nWeek 1: 10\nWeek 18: 0\n\n");
    }

    #[test]
    fn player_without_weeks_prints_only_header() {
        let player = Player {
            name: "Al".into(),
            picks_locator: "x".into(),
            weeks: vec![],
        };
        assert_eq!(player_block(&player), "Al\n==\n\n");
    }
}
