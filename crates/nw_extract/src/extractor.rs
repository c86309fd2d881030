use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::info;

use nw_core::{Error, Result, RunState};

use crate::feed::NewsFeed;

/// NYT business-news feed. Overridable for tests and for other sections.
pub const DEFAULT_ENDPOINT: &str = "https://api.nytimes.com/svc/news/v3/content/nyt/business.json";

/// The API call must never hang a run; the host scheduler decides retries.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// First pipeline stage: fetch the feed, filter it, publish the row set.
#[derive(Debug)]
pub struct Extractor {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl Extractor {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        url::Url::parse(&endpoint).map_err(|e| Error::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(e.into()))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Issue one GET against the feed and publish the filtered row set into
    /// the run state. Returns the published count. On any failure nothing is
    /// written to the run state, so downstream stages see the handoff key as
    /// fully present or absent, never partial.
    pub async fn run(&self, state: &mut RunState) -> Result<usize> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("api-key", self.api_key.as_str())])
            .send()
            .await
            .map_err(Error::TransientNetwork)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let payload = response.text().await.map_err(Error::TransientNetwork)?;
        let feed = NewsFeed::parse(&payload)?;
        let total = feed.results.len();
        let rows = feed.select_articles();

        let count = state.publish_row_set(&rows)?;
        info!(run_id = %state.run_id(), total, kept = count, "extracted articles");
        Ok(count)
    }
}
