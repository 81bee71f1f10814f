// Leaderboard presenter: summary rows drawn as a box-bordered text table.

use pickem_standings::model::Standing;

pub const HEADER: [&str; 6] = [
    "Rank",
    "Change",
    "Name",
    "Total Points",
    "Weekly Points",
    "Weekly Rank",
];

/// One display row per standing, in the given order.
pub fn rows(standings: &[Standing]) -> Vec<[String; 6]> {
    standings
        .iter()
        .map(|s| {
            [
                s.overall_rank.to_string(),
                s.overall_rank_change.to_string(),
                s.name.clone(),
                s.overall_points.to_string(),
                s.weekly_points.to_string(),
                s.weekly_rank.to_string(),
            ]
        })
        .collect()
}

/// Render the header plus one line per standing, each row separated by a
/// rule.
pub fn render(standings: &[Standing]) -> String {
    let header: [String; 6] = HEADER.map(String::from);
    let body = rows(standings);

    let mut widths = header.clone().map(|h| h.chars().count());
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&rule(&widths, '╔', '═', '╤', '╗'));
    for (i, row) in std::iter::once(&header).chain(body.iter()).enumerate() {
        if i > 0 {
            out.push_str(&rule(&widths, '╟', '─', '┼', '╢'));
        }
        out.push_str(&line(&widths, row));
    }
    out.push_str(&rule(&widths, '╚', '═', '╧', '╝'));
    out
}

fn rule(widths: &[usize], left: char, fill: char, join: char, right: char) -> String {
    let segments: Vec<String> = widths
        .iter()
        .map(|&w| fill.to_string().repeat(w + 2))
        .collect();
    format!("{left}{}{right}\n", segments.join(&join.to_string()))
}

fn line(widths: &[usize], cells: &[String; 6]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .zip(cells)
        .map(|(&w, cell)| format!(" {cell:<w$} "))
        .collect();
    format!("║{}║\n", padded.join("│"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickem_standings::model::RankChange;

    fn standing(name: &str, rank: u32, change: RankChange, total: u32) -> Standing {
        Standing {
            name: name.to_string(),
            overall_rank: rank,
            overall_rank_change: change,
            overall_points: total,
            weekly_points: 9,
            weekly_rank: 1,
            weeks: vec![],
        }
    }

    #[test]
    fn rows_follow_header_columns() {
        let rows = rows(&[
            standing("Casey", 1, RankChange::between(3, 1), 16),
            standing("Blake", 2, RankChange::between(1, 2), 15),
            standing("Avery", 3, RankChange::none(), 13),
        ]);

        assert_eq!(rows[0], ["1", "+2", "Casey", "16", "9", "1"].map(String::from));
        assert_eq!(rows[1][1], "-1");
        assert_eq!(rows[2][1], "");
    }

    #[test]
    fn render_draws_bordered_table() {
        let text = render(&[standing("Casey", 1, RankChange::between(3, 1), 16)]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[1],
            "║ Rank │ Change │ Name  │ Total Points │ Weekly Points │ Weekly Rank ║"
        );
        assert_eq!(
            lines[3],
            "║ 1    │ +2     │ Casey │ 16           │ 9             │ 1           ║"
        );
        assert!(lines[0].starts_with('╔') && lines[0].ends_with('╗'));
        assert!(lines[2].starts_with('╟'));
        assert!(lines[4].starts_with('╚'));

        // Every line is the same display width.
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn empty_standings_render_header_only() {
        let text = render(&[]);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("Weekly Rank"));
    }
}
