pub mod polling;
pub mod snapshot_server;

pub use polling::{ClientState, PollHandle, PollOutcome, PollingClient, PollingConfig, DEFAULT_POLL_INTERVAL};
pub use snapshot_server::{SeriesStatus, ServiceUnavailableError, SnapshotServer};
