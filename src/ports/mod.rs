pub mod poll_sink;
pub mod snapshot_feed;

pub use poll_sink::{PollFailure, PollSink, Series};
pub use snapshot_feed::{FeedError, SnapshotFeed};
