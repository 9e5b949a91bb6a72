//! Error types for the adaptive executor.
//!
//! The executor surfaces exactly two failure modes to callers: a rejected
//! submission while shut down, and a shutdown that could not drain its
//! worker threads in time. Everything else (thread launch failures, panics
//! escaping the reactor) is handled internally and logged.

use thiserror::Error;

/// Errors surfaced by the adaptive executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// A task was submitted while the executor is not running.
    #[error("executor is not running")]
    ShutdownInProgress,

    /// Shutdown could not drain all worker threads within the time limit.
    #[error("executor couldn't shut down all worker threads within the time limit")]
    ExceededTimeLimit,
}

/// Convenience alias for executor results.
pub type Result<T> = std::result::Result<T, ExecutorError>;
