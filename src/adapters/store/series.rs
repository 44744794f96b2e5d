use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Series is empty")]
    Empty,

    #[error("Malformed snapshot at index {index}: {reason}")]
    Malformed { index: usize, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Series is empty")]
pub struct EmptySeriesError;

struct SeriesState<T> {
    items: Vec<T>,
    cursor: usize,
}

/// Replayable in-memory series with a cyclic read cursor.
///
/// `next` hands out the items in order and wraps back to the first one after
/// the last. All cursor moves happen under one lock, so concurrent readers see
/// a single global order.
pub struct MockSeriesStore<T> {
    state: Mutex<SeriesState<T>>,
}

impl<T: Clone> MockSeriesStore<T> {
    /// An empty store; every read fails until `load` succeeds
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SeriesState {
                items: Vec::new(),
                cursor: 0,
            }),
        }
    }

    pub fn from_items(items: Vec<T>) -> Result<Self, DataLoadError> {
        let store = Self::new();
        store.load(items)?;
        Ok(store)
    }

    /// Replace the series and rewind the cursor
    pub fn load(&self, items: Vec<T>) -> Result<(), DataLoadError> {
        if items.is_empty() {
            return Err(DataLoadError::Empty);
        }

        let mut state = self.lock();
        state.items = items;
        state.cursor = 0;
        Ok(())
    }

    /// Item under the cursor, then advance the cursor modulo the length
    pub fn next(&self) -> Result<T, EmptySeriesError> {
        let mut state = self.lock();
        let len = state.items.len();
        if len == 0 {
            return Err(EmptySeriesError);
        }

        let item = state.items[state.cursor].clone();
        state.cursor = (state.cursor + 1) % len;
        Ok(item)
    }

    /// First item; does not move the cursor
    pub fn head(&self) -> Result<T, EmptySeriesError> {
        self.lock().items.first().cloned().ok_or(EmptySeriesError)
    }

    pub fn cursor(&self) -> usize {
        self.lock().cursor
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The state is never left half-updated, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, SeriesState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Default for MockSeriesStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
