mod loader;

pub use loader::{load_series, parse_series};
