use chrono::{DateTime, Utc};

use super::FeedError;

/// Which request a poll failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Live,
    History,
}

impl Series {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::History => "history",
        }
    }
}

/// A failed poll, as reported to the observability sink
#[derive(Debug, Clone, PartialEq)]
pub struct PollFailure {
    pub series: Series,
    pub sequence: u64,
    pub error: FeedError,
    pub at: DateTime<Utc>,
}

/// Port for reporting poll failures
pub trait PollSink: Send + Sync {
    fn record_failure(&self, failure: PollFailure);
}
