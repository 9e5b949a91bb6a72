//! Adaptix: adaptive task executor for a database server's request dispatch
//! layer.
//!
//! # Overview
//!
//! Adaptix accepts short-lived work items, each a stage of servicing a
//! client connection, and runs them on a dynamically sized pool of worker
//! threads that self-tune to offered load. Workers measure how much of each
//! reactor run slice they spend executing task bodies and retire when the
//! ratio drops below a threshold; a controller thread watches pool-wide
//! utilization and queue starvation to grow the pool, and injects reserve
//! threads when every worker is blocked downstream.
//!
//! The executor drives a [`Reactor`](reactor::Reactor), the event loop that
//! owns the ready-task queue. The in-crate [`QueueReactor`] implements the
//! contract; the network layer may substitute its own.
//!
//! # Example
//!
//! ```
//! use adaptix::{AdaptiveExecutor, QueueReactor, ScheduleFlags, ServerOptions};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let reactor = Arc::new(QueueReactor::new());
//! let options = Arc::new(ServerOptions::new());
//! options.set_reserved_threads(2);
//!
//! let executor = AdaptiveExecutor::new(reactor, options);
//! executor.start().unwrap();
//! executor
//!     .schedule(|| { /* service one connection stage */ }, ScheduleFlags::NONE)
//!     .unwrap();
//! executor.shutdown(Duration::from_secs(5)).unwrap();
//! ```
//!
//! # Module Structure
//!
//! - [`executor`]: admission, worker lifecycle, controller
//! - [`reactor`]: the event-loop contract and the queue-backed implementation
//! - [`clock`]: tick source and the running/executing timers
//! - [`options`]: live configuration provider
//! - [`stats`]: read-only statistics snapshot
//! - [`error`]: error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod clock;
pub mod error;
pub mod executor;
pub mod options;
pub mod reactor;
pub mod stats;
pub mod util;

pub use clock::{MonotonicClock, ThreadTimer, TickSource, TickTimer};
pub use error::{ExecutorError, Result};
pub use executor::{AdaptiveExecutor, ExecutorHandle, ScheduleFlags};
pub use options::{Options, ServerOptions};
pub use reactor::{QueueReactor, Reactor, Task, WorkGuard};
pub use stats::ExecutorStats;
