//! Tick source and the timers built on top of it.
//!
//! All time accounting in the executor is done in ticks read from a
//! [`TickSource`]. The production source is [`MonotonicClock`], which counts
//! nanoseconds from its creation; tests can substitute their own source.
//!
//! Two timers are layered on the tick source:
//!
//! - [`TickTimer`]: a resettable stopwatch whose `reset` and `since_start`
//!   may race freely across threads (atomic start tick). Used for the
//!   last-schedule timestamp and the controller's per-round timer.
//! - [`ThreadTimer`]: a start/stop accumulator owned by one worker but
//!   readable from the controller mid-interval. Committed ticks plus an
//!   optional open interval live under a short lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A monotonic source of ticks.
///
/// Implementations must be monotonic and have at least microsecond
/// resolution (`ticks_per_second() >= 1_000_000`).
pub trait TickSource: std::fmt::Debug + Send + Sync + 'static {
    /// Returns the current tick count.
    fn ticks(&self) -> u64;

    /// Returns how many ticks elapse per second.
    fn ticks_per_second(&self) -> u64;
}

/// Production tick source counting nanoseconds since its creation.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose tick zero is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicClock {
    fn ticks(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn ticks_per_second(&self) -> u64 {
        1_000_000_000
    }
}

/// Converts ticks to whole microseconds.
///
/// # Panics
///
/// Panics if the source resolution is below one tick per microsecond.
#[must_use]
pub fn ticks_to_micros(ticks: u64, source: &dyn TickSource) -> u64 {
    let per_second = source.ticks_per_second();
    assert!(
        per_second >= 1_000_000,
        "tick source must have at least microsecond resolution"
    );
    ticks / (per_second / 1_000_000)
}

/// A resettable stopwatch over a shared [`TickSource`].
///
/// `reset` and `since_start` are safe to call from any thread.
#[derive(Debug)]
pub struct TickTimer {
    source: Arc<dyn TickSource>,
    start: AtomicU64,
}

impl TickTimer {
    /// Creates a timer started now.
    #[must_use]
    pub fn new(source: Arc<dyn TickSource>) -> Self {
        let start = source.ticks();
        Self {
            source,
            start: AtomicU64::new(start),
        }
    }

    /// Restarts the stopwatch from the current tick.
    pub fn reset(&self) {
        self.start.store(self.source.ticks(), Ordering::Release);
    }

    /// Returns the wall time elapsed since the last reset.
    #[must_use]
    pub fn since_start(&self) -> Duration {
        let elapsed = self
            .source
            .ticks()
            .saturating_sub(self.start.load(Ordering::Acquire));
        let nanos =
            u128::from(elapsed) * 1_000_000_000 / u128::from(self.source.ticks_per_second());
        Duration::from_nanos(nanos as u64)
    }
}

#[derive(Debug, Default)]
struct ThreadTimerState {
    committed: u64,
    started_at: Option<u64>,
}

/// Start/stop tick accumulator for one worker thread.
///
/// The owning thread drives `mark_running`/`mark_stopped`; `total_time` may
/// be called concurrently from the controller and includes the open interval
/// when the timer is currently running.
#[derive(Debug)]
pub struct ThreadTimer {
    source: Arc<dyn TickSource>,
    state: Mutex<ThreadTimerState>,
}

impl ThreadTimer {
    /// Creates a stopped timer.
    #[must_use]
    pub fn new(source: Arc<dyn TickSource>) -> Self {
        Self {
            source,
            state: Mutex::new(ThreadTimerState::default()),
        }
    }

    /// Opens a new interval.
    pub fn mark_running(&self) {
        let now = self.source.ticks();
        let mut state = self.state.lock().expect("thread timer lock poisoned");
        debug_assert!(state.started_at.is_none(), "timer already running");
        state.started_at = Some(now);
    }

    /// Closes the open interval and returns its length in ticks.
    pub fn mark_stopped(&self) -> u64 {
        let now = self.source.ticks();
        let mut state = self.state.lock().expect("thread timer lock poisoned");
        let Some(started_at) = state.started_at.take() else {
            debug_assert!(false, "timer stopped while not running");
            return 0;
        };
        let interval = now.saturating_sub(started_at);
        state.committed += interval;
        interval
    }

    /// Returns committed ticks plus the open interval, if any.
    #[must_use]
    pub fn total_time(&self) -> u64 {
        let now = self.source.ticks();
        let state = self.state.lock().expect("thread timer lock poisoned");
        state.committed
            + state
                .started_at
                .map_or(0, |started_at| now.saturating_sub(started_at))
    }
}
