//! HTTP client for `ISteamUser/GetPlayerSummaries`.

use std::time::Duration;

use steamwatch_core::steam_id::SteamId;

use crate::error::SteamError;
use crate::response::{PlayerSummariesResponse, PlayerSummary};
use crate::retry::{retry, RetryPolicy};

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v2/";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the Steam player summaries endpoint.
#[derive(Clone)]
pub struct SteamClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    retry_policy: RetryPolicy,
}

impl SteamClient {
    /// Create a client against the production endpoint.
    pub fn new(api_key: String, retry_policy: RetryPolicy) -> Result<Self, SteamError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            retry_policy,
        })
    }

    /// Point the client at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Issue a single `GetPlayerSummaries` request. No retries.
    pub async fn get_player_summaries(
        &self,
        steam_id: SteamId,
    ) -> Result<PlayerSummariesResponse, SteamError> {
        let steam_ids = steam_id.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("steamids", steam_ids.as_str())])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch one player's summary, retrying per the client's policy.
    ///
    /// Returns `None` when Steam answers with an empty player list.
    pub async fn fetch_player(&self, steam_id: SteamId) -> Result<Option<PlayerSummary>, SteamError> {
        let response = retry(&self.retry_policy, move || self.get_player_summaries(steam_id)).await?;
        Ok(response.player())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, otherwise capture the
    /// status and body in [`SteamError::Status`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SteamError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SteamError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Read the body and decode it, keeping decode failures distinct from
    /// transport failures.
    async fn parse_response(response: reqwest::Response) -> Result<PlayerSummariesResponse, SteamError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
