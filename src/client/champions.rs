//! Typed access to the champion endpoints

use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{ChampionStats, Fetched, ReadOptions, CHAMPION_STATS_PATH};

/// How long a tier list stays fresh by default
pub const DEFAULT_STATS_TTL: Duration = Duration::from_secs(60);

/// Champion endpoints on top of an [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ChampionsApi {
    client: ApiClient,
    ttl: Duration,
}

impl ChampionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            ttl: DEFAULT_STATS_TTL,
        }
    }

    /// Overrides the cache window; zero always fetches live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Fetches the tier list, served from cache while fresh.
    ///
    /// A payload that is not a JSON array is a format error.
    pub async fn stats(&self, cancel: Option<CancellationToken>) -> Result<Fetched<Vec<ChampionStats>>> {
        let mut options = ReadOptions::new()
            .with_ttl(self.ttl)
            .with_validator(Value::is_array);
        options.cancel = cancel;

        self.client
            .read_with_origin(CHAMPION_STATS_PATH, None, &options)
            .await
    }

    /// Drops every cached champion response.
    pub fn invalidate(&self) -> usize {
        self.client.clear_cache(Some("/api/champions"))
    }
}
