use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::adapters::store::{EmptySeriesError, MockSeriesStore};
use crate::domain::{LiveReading, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No data available")]
pub struct ServiceUnavailableError;

impl From<EmptySeriesError> for ServiceUnavailableError {
    fn from(_: EmptySeriesError) -> Self {
        ServiceUnavailableError
    }
}

/// Series sizes and live cursor position
#[derive(Debug, Clone, Serialize)]
pub struct SeriesStatus {
    pub live_len: usize,
    pub history_len: usize,
    pub live_cursor: usize,
}

/// Request/response boundary over the live and history series
pub struct SnapshotServer {
    live: MockSeriesStore<Snapshot>,
    history: MockSeriesStore<Snapshot>,
    // Snapshot handed out by the preceding get_live call
    last_live: Mutex<Option<Snapshot>>,
}

impl SnapshotServer {
    pub fn new(live: MockSeriesStore<Snapshot>, history: MockSeriesStore<Snapshot>) -> Self {
        Self {
            live,
            history,
            last_live: Mutex::new(None),
        }
    }

    /// Next live snapshot together with the one served before it.
    ///
    /// Advances the live cursor exactly once. `previous` is absent only on the
    /// first call; after a wrap it is the last element of the series.
    pub fn get_live(&self) -> Result<LiveReading, ServiceUnavailableError> {
        // Held across the advance so previous/current pairs follow one global order
        let mut last = self.last_live.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.live.next()?;
        let previous = last.replace(current.clone());

        debug!(cursor = self.live.cursor(), has_previous = previous.is_some(), "Served live snapshot");

        Ok(LiveReading {
            data: current,
            previous,
        })
    }

    /// Head of the history series; no cursor moves
    pub fn get_history(&self) -> Result<Snapshot, ServiceUnavailableError> {
        Ok(self.history.head()?)
    }

    pub fn status(&self) -> SeriesStatus {
        SeriesStatus {
            live_len: self.live.len(),
            history_len: self.history.len(),
            live_cursor: self.live.cursor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::snapshot::fixtures::sample;

    fn version(snapshot: &Snapshot) -> &str {
        &snapshot.battery_status.system_maintenance.version
    }

    fn server(live: &[&str]) -> SnapshotServer {
        let live = live.iter().map(|v| sample(v, 1.0, 2.0)).collect();
        SnapshotServer::new(
            MockSeriesStore::from_items(live).unwrap(),
            MockSeriesStore::from_items(vec![sample("hist", 3.0, 4.0)]).unwrap(),
        )
    }

    #[test]
    fn test_first_live_has_no_previous() {
        let server = server(&["Jan", "Feb", "Mar"]);
        let reading = server.get_live().unwrap();
        assert_eq!(version(&reading.data), "Jan");
        assert!(reading.previous.is_none());
    }

    #[test]
    fn test_previous_is_last_served() {
        let server = server(&["Jan", "Feb", "Mar"]);
        let first = server.get_live().unwrap();
        let second = server.get_live().unwrap();
        assert_eq!(second.previous.as_ref(), Some(&first.data));
        assert_eq!(version(&second.data), "Feb");
    }

    #[test]
    fn test_previous_after_wrap() {
        let server = server(&["Jan", "Feb"]);
        server.get_live().unwrap();
        server.get_live().unwrap();

        let wrapped = server.get_live().unwrap();
        assert_eq!(version(&wrapped.data), "Jan");
        assert_eq!(wrapped.previous.as_ref().map(version), Some("Feb"));
    }

    #[test]
    fn test_single_element_series() {
        let server = server(&["Only"]);
        server.get_live().unwrap();
        let reading = server.get_live().unwrap();
        assert_eq!(reading.previous, Some(reading.data.clone()));
    }

    #[test]
    fn test_history_is_static() {
        let server = server(&["Jan", "Feb"]);
        assert_eq!(version(&server.get_history().unwrap()), "hist");
        assert_eq!(version(&server.get_history().unwrap()), "hist");
        assert_eq!(server.status().live_cursor, 0);
    }

    #[test]
    fn test_each_live_call_advances_once() {
        let server = server(&["Jan", "Feb", "Mar"]);
        server.get_history().unwrap();
        server.get_live().unwrap();
        assert_eq!(server.status().live_cursor, 1);
        server.get_live().unwrap();
        assert_eq!(server.status().live_cursor, 2);
    }

    #[test]
    fn test_empty_stores_unavailable() {
        let server = SnapshotServer::new(MockSeriesStore::new(), MockSeriesStore::new());
        assert_eq!(server.get_live(), Err(ServiceUnavailableError));
        assert_eq!(server.get_history(), Err(ServiceUnavailableError));
        assert_eq!(ServiceUnavailableError.to_string(), "No data available");
    }

    #[test]
    fn test_concurrent_pairs_are_consistent() {
        let names: Vec<String> = (0..4).map(|i| format!("s{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let server = Arc::new(server(&refs));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let server = server.clone();
                std::thread::spawn(move || {
                    (0..100).map(|_| server.get_live().unwrap()).collect::<Vec<_>>()
                })
            })
            .collect();

        let readings: Vec<LiveReading> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        // Every pair is two neighbours in the cycle, never a skipped or repeated step
        for reading in readings.iter().filter(|r| r.previous.is_some()) {
            let current: usize = version(&reading.data)[1..].parse().unwrap();
            let previous: usize = version(reading.previous.as_ref().unwrap())[1..].parse().unwrap();
            assert_eq!((previous + 1) % 4, current);
        }
        assert_eq!(readings.iter().filter(|r| r.previous.is_none()).count(), 1);
    }
}
