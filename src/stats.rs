//! Read-only statistics snapshot.
//!
//! [`ExecutorStats`] is what a status-reporting surface serializes into a
//! server status document. Key names are part of the observability contract
//! and must not change.

use serde::Serialize;

/// Label identifying this executor flavor in status output.
pub const EXECUTOR_LABEL: &str = "adaptive";

/// Point-in-time snapshot of the executor's counters.
///
/// Times are reported in whole microseconds. Queue-depth counters can read
/// above zero after shutdown when posted wrappers were dropped undrained;
/// that drift is documented behavior, not an invariant violation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorStats {
    /// Executor flavor label, always `"adaptive"`.
    pub executor: &'static str,
    /// Number of successful `schedule` calls since start.
    pub total_queued: u64,
    /// Number of task bodies that completed, normally or by panic.
    pub total_executed: u64,
    /// Tasks submitted but not yet picked up by a worker.
    pub tasks_queued: u64,
    /// Deferred tasks submitted but not yet picked up by a worker.
    pub deferred_tasks_queued: u64,
    /// Workers currently executing a task body (outermost frame).
    pub threads_in_use: usize,
    /// Total time workers spent checked out by the reactor.
    pub total_time_running_micros: u64,
    /// Total time workers spent with a task body on the stack.
    pub total_time_executing_micros: u64,
    /// Cumulative time tasks spent waiting between submission and pickup.
    pub total_time_queued_micros: u64,
    /// Live worker threads.
    pub threads_running: usize,
    /// Workers spawned but yet to finish their first run slice.
    pub threads_pending: usize,
}
