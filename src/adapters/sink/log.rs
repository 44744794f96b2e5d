use tracing::warn;

use crate::ports::{PollFailure, PollSink};

/// Reports poll failures as `warn` events
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl PollSink for TracingSink {
    fn record_failure(&self, failure: PollFailure) {
        warn!(
            series = failure.series.as_str(),
            sequence = failure.sequence,
            "Poll failed, keeping stale data: {}",
            failure.error
        );
    }
}
