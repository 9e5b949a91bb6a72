//! Executor configuration provider.
//!
//! Every value is re-read on each use, so a provider backed by mutable
//! server parameters reconfigures the executor live. [`ServerOptions`] is
//! the production provider; tests construct one and tighten the timings.
//!
//! # Defaults
//!
//! | Option | Default |
//! |--------|---------|
//! | `reserved_threads` | `-1` → `max(cores / 2, 2)`, memoized on first use |
//! | `worker_thread_run_time` | 5000 ms |
//! | `run_time_jitter` | 500 ms |
//! | `stuck_thread_timeout` | 250 ms |
//! | `max_queue_latency` | 500 µs |
//! | `idle_pct_threshold` | 60 % |
//! | `recursion_limit` | 8 |

use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

/// Configuration surface read by the executor.
pub trait Options: Send + Sync + 'static {
    /// Minimum pool size: the floor for voluntary exit and the reserve
    /// refill target.
    fn reserved_threads(&self) -> usize;

    /// Base length of a worker's reactor run slice.
    fn worker_thread_run_time(&self) -> Duration;

    /// Magnitude in milliseconds of the uniform jitter applied once per
    /// worker to desynchronize slice boundaries.
    fn run_time_jitter(&self) -> u64;

    /// Controller wait cap, and the threshold for stuck detection.
    fn stuck_thread_timeout(&self) -> Duration;

    /// Per-iteration sleep while waiting for pending threads to start.
    fn max_queue_latency(&self) -> Duration;

    /// Executing percentage below which workers beyond the reserve exit and
    /// the controller refuses to grow the pool.
    fn idle_pct_threshold(&self) -> u32;

    /// Exclusive upper bound on recursion depth honored by `MAY_RECURSE`.
    fn recursion_limit(&self) -> usize;
}

/// Atomics-backed options provider with live mutators.
#[derive(Debug)]
pub struct ServerOptions {
    reserved_threads: AtomicI64,
    worker_thread_run_time_ms: AtomicU64,
    run_time_jitter_ms: AtomicU64,
    stuck_thread_timeout_ms: AtomicU64,
    max_queue_latency_us: AtomicU64,
    idle_pct_threshold: AtomicU32,
    recursion_limit: AtomicUsize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            reserved_threads: AtomicI64::new(-1),
            worker_thread_run_time_ms: AtomicU64::new(5000),
            run_time_jitter_ms: AtomicU64::new(500),
            stuck_thread_timeout_ms: AtomicU64::new(250),
            max_queue_latency_us: AtomicU64::new(500),
            idle_pct_threshold: AtomicU32::new(60),
            recursion_limit: AtomicUsize::new(8),
        }
    }
}

impl ServerOptions {
    /// Creates a provider with the default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reserved thread count. `-1` re-enables the cores/2 default.
    pub fn set_reserved_threads(&self, value: i64) {
        self.reserved_threads.store(value, Ordering::Relaxed);
    }

    /// Sets the base worker run slice.
    pub fn set_worker_thread_run_time(&self, value: Duration) {
        self.worker_thread_run_time_ms
            .store(value.as_millis() as u64, Ordering::Relaxed);
    }

    /// Sets the jitter magnitude in milliseconds.
    pub fn set_run_time_jitter(&self, millis: u64) {
        self.run_time_jitter_ms.store(millis, Ordering::Relaxed);
    }

    /// Sets the controller wait cap / stuck detection threshold.
    pub fn set_stuck_thread_timeout(&self, value: Duration) {
        self.stuck_thread_timeout_ms
            .store(value.as_millis() as u64, Ordering::Relaxed);
    }

    /// Sets the pending-thread latency budget.
    pub fn set_max_queue_latency(&self, value: Duration) {
        self.max_queue_latency_us
            .store(value.as_micros() as u64, Ordering::Relaxed);
    }

    /// Sets the idle percentage threshold.
    pub fn set_idle_pct_threshold(&self, pct: u32) {
        self.idle_pct_threshold.store(pct, Ordering::Relaxed);
    }

    /// Sets the recursion depth limit.
    pub fn set_recursion_limit(&self, limit: usize) {
        self.recursion_limit.store(limit, Ordering::Relaxed);
    }
}

impl Options for ServerOptions {
    fn reserved_threads(&self) -> usize {
        let value = self.reserved_threads.load(Ordering::Relaxed);
        if value >= 0 {
            return value as usize;
        }
        let cores = std::thread::available_parallelism().map_or(2, std::num::NonZeroUsize::get);
        let resolved = (cores / 2).max(2);
        self.reserved_threads
            .store(resolved as i64, Ordering::Relaxed);
        info!(
            reserved = resolved,
            "no thread count configured for executor; using number of cores / 2"
        );
        resolved
    }

    fn worker_thread_run_time(&self) -> Duration {
        Duration::from_millis(self.worker_thread_run_time_ms.load(Ordering::Relaxed))
    }

    fn run_time_jitter(&self) -> u64 {
        self.run_time_jitter_ms.load(Ordering::Relaxed)
    }

    fn stuck_thread_timeout(&self) -> Duration {
        Duration::from_millis(self.stuck_thread_timeout_ms.load(Ordering::Relaxed))
    }

    fn max_queue_latency(&self) -> Duration {
        Duration::from_micros(self.max_queue_latency_us.load(Ordering::Relaxed))
    }

    fn idle_pct_threshold(&self) -> u32 {
        self.idle_pct_threshold.load(Ordering::Relaxed)
    }

    fn recursion_limit(&self) -> usize {
        self.recursion_limit.load(Ordering::Relaxed)
    }
}
