use std::sync::{Mutex, PoisonError};

use crate::ports::{PollFailure, PollSink};

/// Keeps every reported failure in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    failures: Mutex<Vec<PollFailure>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<PollFailure> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PollSink for MemorySink {
    fn record_failure(&self, failure: PollFailure) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure);
    }
}
