use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::domain::{LiveReading, Snapshot};
use crate::ports::{FeedError, SnapshotFeed};

/// Snapshot feed over HTTP using reqwest
pub struct HttpFeed {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeed {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FeedError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| FeedError::Malformed(e.to_string()))
    }
}

fn validated(snapshot: &Snapshot) -> Result<(), FeedError> {
    snapshot
        .validate()
        .map_err(|e| FeedError::Malformed(e.to_string()))
}

#[async_trait]
impl SnapshotFeed for HttpFeed {
    async fn fetch_live(&self) -> Result<LiveReading, FeedError> {
        let reading: LiveReading = self.get_json("/api/live").await?;

        validated(&reading.data)?;
        if let Some(previous) = &reading.previous {
            validated(previous)?;
        }

        Ok(reading)
    }

    async fn fetch_history(&self) -> Result<Snapshot, FeedError> {
        // History is served as a single-element array
        let history: Vec<Snapshot> = self.get_json("/api/history").await?;
        let snapshot = history
            .into_iter()
            .next()
            .ok_or_else(|| FeedError::Malformed("empty history array".to_string()))?;

        validated(&snapshot)?;
        Ok(snapshot)
    }
}
