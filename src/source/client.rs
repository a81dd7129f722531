use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default public host of the MLB Stats API
pub const DEFAULT_BASE_URL: &str = "http://statsapi.mlb.com";

/// Total time allowed per request; `None` waits for slow responses indefinitely
pub const REQUEST_TIMEOUT: Option<Duration> = None;

/// Anything that can answer a GET for a Stats API resource path with a JSON body
pub trait StatsSource {
    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value>;
}

/// Blocking HTTP client for the Stats API
pub struct HttpStatsSource {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpStatsSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        // The blocking client defaults to a 30s total timeout
        let client = Client::builder()
            .user_agent(concat!("mlb-stats-to-sqlite/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl StatsSource for HttpStatsSource {
    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Stats API returned an error for {}", url))?;

        response
            .json()
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let source = HttpStatsSource::new("http://statsapi.mlb.com/").unwrap();
        assert_eq!(source.base_url(), "http://statsapi.mlb.com");
        assert_eq!(
            source.url("/api/v1/sports"),
            "http://statsapi.mlb.com/api/v1/sports"
        );
        assert_eq!(
            source.url("api/v1/teams"),
            "http://statsapi.mlb.com/api/v1/teams"
        );
    }

    #[test]
    fn test_client_has_no_request_timeout() {
        let source = HttpStatsSource::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(source.timeout(), None);
        assert_eq!(REQUEST_TIMEOUT, None);
    }
}
