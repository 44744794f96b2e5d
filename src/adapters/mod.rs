pub mod fixtures;
pub mod http;
pub mod sink;
pub mod store;

pub use fixtures::{load_series, parse_series};
pub use http::HttpFeed;
pub use sink::{MemorySink, TracingSink};
pub use store::{DataLoadError, EmptySeriesError, MockSeriesStore};
