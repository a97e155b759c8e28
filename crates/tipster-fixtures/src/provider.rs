//! Client for the external fixture/odds provider.
//!
//! The provider is asked for every fixture in a period window and answers
//! with `{ "fixtures": [...] }`. Each way the call can fail is kept apart in
//! [`ProviderError`] so callers can report it precisely.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use tipster_types::period::PeriodWindow;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("fixture provider timed out")]
    Timeout,
    #[error("fixture provider unreachable: {0}")]
    Transport(String),
    #[error("fixture provider answered with status {0}")]
    Status(u16),
    #[error("fixture provider sent a malformed response: {0}")]
    Malformed(String),
    #[error("fixture provider returned no fixtures for the window")]
    Empty,
}

/// Fixture ids arrive as strings from some feeds and numbers from others.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FixtureId {
    Text(String),
    Number(i64),
}

impl FixtureId {
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderOdds {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

/// One fixture as the provider describes it, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFixture {
    pub id: FixtureId,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub league: Option<String>,
    pub kickoff: String,
    #[serde(default)]
    pub odds: Option<ProviderOdds>,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    fixtures: Vec<ProviderFixture>,
}

#[async_trait]
pub trait FixtureProvider: Send + Sync {
    /// Every fixture kicking off inside `window`. An empty answer is
    /// reported as [`ProviderError::Empty`].
    async fn fetch(&self, window: PeriodWindow) -> Result<Vec<ProviderFixture>, ProviderError>;
}

/// Provider reached over HTTP at `{base}/fixtures?from=..&to=..`.
pub struct HttpFixtureProvider {
    client: Client,
    base: Url,
    api_key: Option<String>,
}

impl HttpFixtureProvider {
    /// Build a provider whose requests give up after `timeout`.
    pub fn new(base: Url, timeout: Duration, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base, api_key })
    }

    fn fixtures_url(&self, window: PeriodWindow) -> Result<Url, ProviderError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::Transport(format!("invalid provider base url {}", self.base)))?
            .pop_if_empty()
            .push("fixtures");
        url.query_pairs_mut()
            .append_pair("from", &window.from.to_string())
            .append_pair("to", &window.to.to_string());
        Ok(url)
    }
}

#[async_trait]
impl FixtureProvider for HttpFixtureProvider {
    async fn fetch(&self, window: PeriodWindow) -> Result<Vec<ProviderFixture>, ProviderError> {
        let url = self.fixtures_url(window)?;
        debug!("Fetching fixtures from {}", url);

        let mut request = self.client.get(url).header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            warn!("Fixture provider returned {}", status);
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        parse_fixtures(&body)
    }
}

fn map_transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(error.to_string())
    }
}

/// Decode a provider body, rejecting malformed and empty answers.
pub fn parse_fixtures(body: &[u8]) -> Result<Vec<ProviderFixture>, ProviderError> {
    let response: ProviderResponse =
        serde_json::from_slice(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    if response.fixtures.is_empty() {
        return Err(ProviderError::Empty);
    }
    Ok(response.fixtures)
}
