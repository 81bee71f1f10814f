// HTTP client for the NFL weekly pick'em site.

use std::time::Duration;

use async_trait::async_trait;
use pickem_core::config::SourceConfig;
use pickem_standings::error::FetchError;
use pickem_standings::fetch::{RosterSource, WeekFetcher};
use pickem_standings::model::{RosterEntry, WeekReport};
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::pages;

/// Fetches group and picks pages over HTTP.
pub struct NflPickemSite {
    client: Client,
    base_url: String,
}

impl NflPickemSite {
    /// Create a client for the site described by `source`.
    pub fn new(source: &SourceConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(source.timeout_secs));
        if let Some(agent) = &source.user_agent {
            builder = builder.user_agent(agent.as_str());
        }
        let client = builder.build().map_err(|e| FetchError::Transport {
            url: source.base_url.clone(),
            source: Box::new(e),
        })?;

        Ok(Self {
            client,
            base_url: source.base_url.clone(),
        })
    }

    /// GET a page and return its body. Non-success statuses are errors.
    async fn get_html(&self, url: &Url) -> Result<String, FetchError> {
        debug!(%url, "fetching page");
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source: Box::new(e),
        };

        let response = self.client.get(url.clone()).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }
}

#[async_trait]
impl RosterSource for NflPickemSite {
    async fn roster(&self, group_id: &str) -> Result<Vec<RosterEntry>, FetchError> {
        let url = pages::group_url(&self.base_url, group_id)?;
        let html = self.get_html(&url).await?;
        let roster = pages::parse_roster(&html, &url)?;
        info!(group_id, players = roster.len(), "group roster loaded");
        Ok(roster)
    }
}

#[async_trait]
impl WeekFetcher for NflPickemSite {
    async fn fetch_week(&self, picks_locator: &str, week: u32) -> Result<WeekReport, FetchError> {
        let url = pages::week_url(picks_locator, week)?;
        let html = self.get_html(&url).await?;
        let report = pages::parse_week(&html, url.as_str())?;
        debug!(
            %url,
            correct = report.tally.correct,
            incorrect = report.tally.incorrect,
            incomplete = report.has_incomplete_games,
            "week page read"
        );
        Ok(report)
    }
}
