// Page addresses and HTML extraction for the group and picks pages.

use std::collections::HashSet;

use pickem_standings::error::FetchError;
use pickem_standings::model::{RosterEntry, WeekReport, WeekTally};
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::warn;

/// Link to each member's picks on the group page.
const ENTRY_LINK: &str = ".groupEntryName a";
/// Suffix the site appends to every member's display name.
const PICKS_SUFFIX: &str = "'s picks";

const CORRECT_PICK: &str = ".slider-correct";
const INCORRECT_PICK: &str = ".slider-incorrect";
const GAME_IN_PROGRESS: &str = ".game-state-active";
const GAME_NOT_STARTED: &str = ".game-state-pre";

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// The group standings page, `{base_url}/group/{group_id}`.
pub fn group_url(base_url: &str, group_id: &str) -> Result<Url, FetchError> {
    let raw = format!("{}/group/{}", base_url.trim_end_matches('/'), group_id);
    Url::parse(&raw).map_err(|e| FetchError::Parse {
        url: raw.clone(),
        message: e.to_string(),
    })
}

/// A player's picks page for one week: the picks locator with `week=N`
/// added to its query string.
pub fn week_url(picks_locator: &str, week: u32) -> Result<Url, FetchError> {
    let mut url = Url::parse(picks_locator).map_err(|e| FetchError::Parse {
        url: picks_locator.to_string(),
        message: e.to_string(),
    })?;
    url.query_pairs_mut().append_pair("week", &week.to_string());
    Ok(url)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn selector(css: &str, url: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Parse {
        url: url.to_string(),
        message: format!("bad selector {css}: {e}"),
    })
}

/// Extract group members from the group page. Relative picks links are
/// resolved against `page_url`.
pub fn parse_roster(html: &str, page_url: &Url) -> Result<Vec<RosterEntry>, FetchError> {
    let document = Html::parse_document(html);
    let link = selector(ENTRY_LINK, page_url.as_str())?;

    let mut seen = HashSet::new();
    let mut roster = Vec::new();

    for element in document.select(&link) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let text = element.text().collect::<String>();
        let name = text.replacen(PICKS_SUFFIX, "", 1).trim().to_string();
        if name.is_empty() {
            continue;
        }

        let locator = page_url.join(href).map_err(|e| FetchError::Parse {
            url: page_url.to_string(),
            message: format!("bad picks link {href}: {e}"),
        })?;

        if !seen.insert(name.clone()) {
            warn!(player = %name, "duplicate display name on group page; cached weeks will be shared");
        }
        roster.push(RosterEntry::new(name, locator.to_string()));
    }

    Ok(roster)
}

/// Count graded picks on a week page and note whether any game is still
/// in progress or yet to start.
pub fn parse_week(html: &str, url: &str) -> Result<WeekReport, FetchError> {
    let document = Html::parse_document(html);
    let count = |css: &str| -> Result<usize, FetchError> {
        Ok(document.select(&selector(css, url)?).count())
    };

    let correct = count(CORRECT_PICK)?;
    let incorrect = count(INCORRECT_PICK)?;
    let pending = count(GAME_IN_PROGRESS)? + count(GAME_NOT_STARTED)?;

    Ok(WeekReport {
        tally: WeekTally::new(correct as u32, incorrect as u32),
        has_incomplete_games: pending > 0,
    })
}
