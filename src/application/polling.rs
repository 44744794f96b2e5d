use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::domain::{LiveReading, PowerTrends, Snapshot};
use crate::ports::{FeedError, PollFailure, PollSink, Series, SnapshotFeed};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// What the client currently knows about the server
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    pub current: Option<Snapshot>,
    pub previous: Option<Snapshot>,
    pub history: Option<Snapshot>,
    /// When the last response was applied
    pub last_fetch: Option<DateTime<Utc>>,
    /// Sequence number of the last applied live response (0 = none)
    pub live_sequence: u64,
    /// Sequence number of the last applied history response (0 = none)
    pub history_sequence: u64,
}

impl ClientState {
    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// Generation trends from `previous` to `current`, once a live reading exists
    pub fn power_trends(&self) -> Option<PowerTrends> {
        self.current
            .as_ref()
            .map(|current| PowerTrends::between(self.previous.as_ref(), current))
    }
}

/// Result of a single poll request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Applied,
    /// Response arrived but was older than the stored state, or the run was stopped
    Stale,
    Failed,
}

#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Also poll the history series on every tick
    pub include_history: bool,
}

/// Identifies one `start` run; pass it to `stop`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollHandle {
    generation: u64,
}

struct Shared {
    feed: Arc<dyn SnapshotFeed>,
    sink: Arc<dyn PollSink>,
    state: watch::Sender<ClientState>,
    // Bumped on start and stop, always while holding the state lock
    generation: AtomicU64,
    sequence: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn poll_live(self: &Arc<Self>, generation: u64) -> BoxFuture<'static, PollOutcome> {
        let sequence = self.next_sequence();
        let shared = Arc::clone(self);

        async move {
            // A tick that fired just before `stop` must not reach the server
            if shared.current_generation() != generation {
                return PollOutcome::Stale;
            }
            match shared.feed.fetch_live().await {
                Ok(reading) => shared.apply_live(generation, sequence, reading),
                Err(error) => shared.fail(Series::Live, sequence, error),
            }
        }
        .boxed()
    }

    fn poll_history(self: &Arc<Self>, generation: u64) -> BoxFuture<'static, PollOutcome> {
        let sequence = self.next_sequence();
        let shared = Arc::clone(self);

        async move {
            if shared.current_generation() != generation {
                return PollOutcome::Stale;
            }
            match shared.feed.fetch_history().await {
                Ok(snapshot) => shared.apply_history(generation, sequence, snapshot),
                Err(error) => shared.fail(Series::History, sequence, error),
            }
        }
        .boxed()
    }

    fn apply_live(&self, generation: u64, sequence: u64, reading: LiveReading) -> PollOutcome {
        let mut outcome = PollOutcome::Stale;

        self.state.send_if_modified(|state| {
            if self.current_generation() != generation || sequence <= state.live_sequence {
                return false;
            }

            state.current = Some(reading.data);
            if let Some(previous) = reading.previous {
                state.previous = Some(previous);
            }
            state.live_sequence = sequence;
            state.last_fetch = Some(Utc::now());
            outcome = PollOutcome::Applied;
            true
        });

        debug!(sequence, ?outcome, "Live response");
        outcome
    }

    fn apply_history(&self, generation: u64, sequence: u64, snapshot: Snapshot) -> PollOutcome {
        let mut outcome = PollOutcome::Stale;

        self.state.send_if_modified(|state| {
            if self.current_generation() != generation || sequence <= state.history_sequence {
                return false;
            }

            state.history = Some(snapshot);
            state.history_sequence = sequence;
            state.last_fetch = Some(Utc::now());
            outcome = PollOutcome::Applied;
            true
        });

        debug!(sequence, ?outcome, "History response");
        outcome
    }

    fn fail(&self, series: Series, sequence: u64, error: FeedError) -> PollOutcome {
        self.sink.record_failure(PollFailure {
            series,
            sequence,
            error,
            at: Utc::now(),
        });
        PollOutcome::Failed
    }
}

/// Keeps a live view of a snapshot server by polling it on a fixed interval.
///
/// Failed polls are reported to the sink and leave the stored state as it
/// was. Responses are applied in sequence order only, so a slow request that
/// completes after a newer one is dropped.
pub struct PollingClient {
    shared: Arc<Shared>,
    config: PollingConfig,
}

impl PollingClient {
    pub fn new(feed: Arc<dyn SnapshotFeed>, sink: Arc<dyn PollSink>, config: PollingConfig) -> Self {
        let (state, _) = watch::channel(ClientState::default());

        Self {
            shared: Arc::new(Shared {
                feed,
                sink,
                state,
                generation: AtomicU64::new(0),
                sequence: AtomicU64::new(0),
                timer: Mutex::new(None),
            }),
            config,
        }
    }

    /// Start polling: once immediately, then every `interval`.
    ///
    /// Each tick spawns its requests and moves on, so a slow response never
    /// delays the next tick. A run already in progress is superseded. Must be
    /// called from within a tokio runtime.
    pub fn start(&self, interval: Duration) -> PollHandle {
        let generation = self.bump_generation(None).unwrap_or_default();
        let shared = Arc::clone(&self.shared);
        let period = interval.max(Duration::from_millis(1));
        let include_history = self.config.include_history;

        let timer = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if shared.current_generation() != generation {
                    break;
                }

                tokio::spawn(shared.poll_live(generation));
                if include_history {
                    tokio::spawn(shared.poll_history(generation));
                }
            }
        });

        if let Some(old) = self.shared.timer().replace(timer) {
            old.abort();
        }

        info!(generation, interval_ms = period.as_millis() as u64, "Polling started");
        PollHandle { generation }
    }

    /// Stop the run identified by `handle`.
    ///
    /// No timer tick fires afterwards and no in-flight response of that run is
    /// applied once this returns. Stopping twice, or with a handle superseded
    /// by a later `start`, does nothing.
    pub fn stop(&self, handle: &PollHandle) {
        if self.bump_generation(Some(handle.generation)).is_none() {
            return;
        }

        if let Some(timer) = self.shared.timer().take() {
            timer.abort();
        }
        info!(generation = handle.generation, "Polling stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared
            .timer()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Issue one poll now, outside the timer
    pub fn refresh(&self) {
        tokio::spawn(self.poll_live());
        if self.config.include_history {
            tokio::spawn(self.poll_history());
        }
    }

    /// A single live poll. The sequence number is taken when this is called,
    /// not when the returned future is first polled.
    pub fn poll_live(&self) -> BoxFuture<'static, PollOutcome> {
        self.shared.poll_live(self.shared.current_generation())
    }

    /// A single history poll, sequenced like `poll_live`
    pub fn poll_history(&self) -> BoxFuture<'static, PollOutcome> {
        self.shared.poll_history(self.shared.current_generation())
    }

    pub fn state(&self) -> ClientState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that is notified whenever the state changes
    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.shared.state.subscribe()
    }

    // Bump under the state lock so no response can be applied concurrently
    // with a start or stop. With `expected`, only bumps if it still matches.
    fn bump_generation(&self, expected: Option<u64>) -> Option<u64> {
        let mut bumped = None;

        self.shared.state.send_if_modified(|_| {
            let generation = &self.shared.generation;
            bumped = match expected {
                Some(current) => generation
                    .compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
                    .ok()
                    .map(|previous| previous + 1),
                None => Some(generation.fetch_add(1, Ordering::SeqCst) + 1),
            };
            false
        });

        bumped
    }
}

impl Drop for PollingClient {
    fn drop(&mut self) {
        if let Some(timer) = self.shared.timer().take() {
            timer.abort();
        }
    }
}
