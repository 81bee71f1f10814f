// Cumulative standings with standard competition ranking.
//
// Weeks are processed in order. For each week every player's cumulative
// points are extended, then players are ranked twice: overall (by cumulative
// points) and weekly (by that week's points alone). Equal values share the
// better rank and the next distinct value resumes at its 1-based position,
// so points [10, 10, 7] rank as [1, 1, 3].
//
// Both rankings stable-sort one shared player ordering that carries over
// from week to week. Ties are never broken by name or any other key; tied
// players simply keep the relative order they already had, and the final
// table inherits it.

use tracing::{debug, warn};

use crate::error::StandingsError;
use crate::model::{Player, RankChange, RankedWeek, Standing};
use crate::FrontierPolicy;

/// Rank every player week by week and summarise the final week.
///
/// Returns standings sorted by overall rank. An empty player list yields
/// empty standings. Unequal week counts are handled according to `policy`.
pub fn compute_standings(
    players: &[Player],
    policy: FrontierPolicy,
) -> Result<Vec<Standing>, StandingsError> {
    if players.is_empty() {
        return Ok(Vec::new());
    }

    let week_count = common_week_count(players, policy)?;
    if week_count == 0 {
        return Err(StandingsError::NoCompletedWeeks);
    }

    let mut ranked: Vec<Vec<RankedWeek>> = players
        .iter()
        .map(|p| {
            p.weeks[..week_count]
                .iter()
                .map(|&record| RankedWeek {
                    record,
                    overall_points: 0,
                    overall_rank: 0,
                    weekly_rank: 0,
                })
                .collect()
        })
        .collect();

    let mut order: Vec<usize> = (0..players.len()).collect();

    for i in 0..week_count {
        for weeks in ranked.iter_mut() {
            let previous = if i == 0 { 0 } else { weeks[i - 1].overall_points };
            weeks[i].overall_points = previous + weeks[i].record.points;
        }

        let overall = rank_descending(&mut order, |p| ranked[p][i].overall_points);
        for (&p, rank) in order.iter().zip(overall) {
            ranked[p][i].overall_rank = rank;
        }

        let weekly = rank_descending(&mut order, |p| ranked[p][i].record.points);
        for (&p, rank) in order.iter().zip(weekly) {
            ranked[p][i].weekly_rank = rank;
        }

        debug!(week = i + 1, "week ranked");
    }

    // Stable, so tied ranks keep the order left by the last weekly ranking.
    order.sort_by_key(|&p| ranked[p][week_count - 1].overall_rank);

    let standings = order
        .into_iter()
        .map(|p| summarise(&players[p].name, std::mem::take(&mut ranked[p])))
        .collect();

    Ok(standings)
}

/// Build a player's summary from their ranked weeks (at least one).
fn summarise(name: &str, weeks: Vec<RankedWeek>) -> Standing {
    let current = weeks[weeks.len() - 1];
    let overall_rank_change = match weeks.len() {
        0 | 1 => RankChange::none(),
        n => RankChange::between(weeks[n - 2].overall_rank, current.overall_rank),
    };

    Standing {
        name: name.to_string(),
        overall_rank: current.overall_rank,
        overall_rank_change,
        overall_points: current.overall_points,
        weekly_points: current.record.points,
        weekly_rank: current.weekly_rank,
        weeks,
    }
}

/// Number of weeks every player will be ranked over.
fn common_week_count(players: &[Player], policy: FrontierPolicy) -> Result<usize, StandingsError> {
    let expected = players[0].weeks.len();

    match policy {
        FrontierPolicy::Strict => {
            if let Some(p) = players.iter().find(|p| p.weeks.len() != expected) {
                return Err(StandingsError::UnequalWeekCounts {
                    player: p.name.clone(),
                    expected,
                    found: p.weeks.len(),
                });
            }
            Ok(expected)
        }
        FrontierPolicy::Truncate => {
            let shortest = players.iter().map(|p| p.weeks.len()).min().unwrap_or(0);
            let longest = players.iter().map(|p| p.weeks.len()).max().unwrap_or(0);
            if shortest != longest {
                warn!(
                    shortest,
                    longest, "players have different week counts; ranking common weeks only"
                );
            }
            Ok(shortest)
        }
    }
}

/// Stable-sort `order` by descending `key`, then return the standard
/// competition rank of each position in the new order.
fn rank_descending<K, F>(order: &mut [usize], key: F) -> Vec<u32>
where
    K: Ord + Copy,
    F: Fn(usize) -> K,
{
    order.sort_by(|&a, &b| key(b).cmp(&key(a)));

    let mut ranks: Vec<u32> = Vec::with_capacity(order.len());
    for (position, &p) in order.iter().enumerate() {
        let rank = match position {
            0 => 1,
            _ if key(order[position - 1]) == key(p) => ranks[position - 1],
            _ => position as u32 + 1,
        };
        ranks.push(rank);
    }
    ranks
}
