mod series;

pub use series::{DataLoadError, EmptySeriesError, MockSeriesStore};
