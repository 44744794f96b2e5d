use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{LiveReading, Snapshot};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Port for fetching snapshots from a snapshot server
#[async_trait]
pub trait SnapshotFeed: Send + Sync {
    /// Fetch the current live reading (advances the server's live cursor)
    async fn fetch_live(&self) -> Result<LiveReading, FeedError>;

    /// Fetch the history aggregate
    async fn fetch_history(&self) -> Result<Snapshot, FeedError>;
}
