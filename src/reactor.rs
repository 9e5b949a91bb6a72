//! Reactor contract and the queue-backed production implementation.
//!
//! The executor never owns a task queue of its own; it drives a [`Reactor`]
//! from its worker threads and submits wrapped tasks to it. The contract is
//! that of an event loop:
//!
//! - `post` enqueues a task, never running it on the caller.
//! - `dispatch` runs the task inline when the calling thread is currently
//!   driving this reactor, otherwise it degrades to `post`.
//! - `run_for` / `run_one_for` drive ready tasks on the calling thread for a
//!   bounded wall time; the one-shot variant returns after a single task.
//! - When the queue drains and no [`WorkGuard`] is outstanding, or when the
//!   bounded run reaches its deadline, the reactor enters the stopped state
//!   and `run_*` returns immediately until `restart` is called. A work guard
//!   prevents the early out-of-work return only; it does not suppress the
//!   post-deadline stop, so drivers must expect `stopped()` after an idle
//!   slice and restart before the next one.
//!
//! [`QueueReactor`] implements the contract with a lock-free FIFO queue and
//! condvar parking for idle drivers. Task panics propagate out of `run_*` to
//! the driving caller, which is expected to treat them as fatal for its own
//! run slice.

use crossbeam_queue::SegQueue;
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A unit of work submitted to a reactor.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// The event-loop contract consumed by the executor.
pub trait Reactor: Send + Sync + 'static {
    /// Enqueues a task. Never runs it on the calling thread.
    fn post(&self, task: Task);

    /// Runs the task inline if the calling thread is currently driving this
    /// reactor, otherwise posts it.
    fn dispatch(&self, task: Task);

    /// Drives ready tasks for at most `duration`. Returns the number of
    /// tasks executed. Reaching the deadline leaves the reactor stopped, as
    /// does running out of work with no guard outstanding.
    fn run_for(&self, duration: Duration) -> usize;

    /// Drives ready tasks until one task has completed or `duration` has
    /// elapsed. Returns the number of tasks executed (zero or one). A
    /// timed-out call leaves the reactor stopped.
    fn run_one_for(&self, duration: Duration) -> usize;

    /// Stops the reactor: every in-progress `run_*` call returns.
    fn stop(&self);

    /// Returns true if the reactor is in the stopped state.
    fn stopped(&self) -> bool;

    /// Clears the stopped state so the reactor can be driven again.
    fn restart(&self);

    /// Registers outstanding work. Prefer [`WorkGuard`].
    fn work_started(&self);

    /// Releases outstanding work registered with `work_started`.
    fn work_finished(&self);
}

impl fmt::Debug for dyn Reactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactor")
            .field("stopped", &self.stopped())
            .finish()
    }
}

/// RAII token that keeps a reactor's `run_*` calls from returning early for
/// lack of work.
#[derive(Debug)]
pub struct WorkGuard<'a> {
    reactor: &'a dyn Reactor,
}

impl<'a> WorkGuard<'a> {
    /// Registers work against `reactor` for the guard's lifetime.
    #[must_use]
    pub fn new(reactor: &'a dyn Reactor) -> Self {
        reactor.work_started();
        Self { reactor }
    }
}

impl Drop for WorkGuard<'_> {
    fn drop(&mut self) {
        self.reactor.work_finished();
    }
}

thread_local! {
    /// (reactor id, drive depth) for the reactor this thread is driving.
    static CURRENT_DRIVE: Cell<(usize, usize)> = const { Cell::new((0, 0)) };
}

/// Restores the previous drive marker when a `run_*` call unwinds.
struct DriveGuard {
    previous: (usize, usize),
}

impl DriveGuard {
    fn enter(reactor_id: usize) -> Self {
        let previous = CURRENT_DRIVE.with(Cell::get);
        let depth = if previous.0 == reactor_id {
            previous.1 + 1
        } else {
            1
        };
        CURRENT_DRIVE.with(|cell| cell.set((reactor_id, depth)));
        Self { previous }
    }
}

impl Drop for DriveGuard {
    fn drop(&mut self) {
        let previous = self.previous;
        CURRENT_DRIVE.with(|cell| cell.set(previous));
    }
}

static NEXT_REACTOR_ID: AtomicUsize = AtomicUsize::new(1);

/// FIFO queue reactor with condvar parking for idle drivers.
pub struct QueueReactor {
    id: usize,
    queue: SegQueue<Task>,
    stopped: AtomicBool,
    outstanding_work: AtomicUsize,
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl fmt::Debug for QueueReactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueReactor")
            .field("id", &self.id)
            .field("queued", &self.queue.len())
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .field(
                "outstanding_work",
                &self.outstanding_work.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl QueueReactor {
    /// Creates an empty reactor in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_REACTOR_ID.fetch_add(1, Ordering::Relaxed),
            queue: SegQueue::new(),
            stopped: AtomicBool::new(false),
            outstanding_work: AtomicUsize::new(0),
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
        }
    }

    /// Returns the number of queued tasks.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    fn running_in_this_thread(&self) -> bool {
        let (reactor_id, depth) = CURRENT_DRIVE.with(Cell::get);
        reactor_id == self.id && depth > 0
    }

    fn run_until(&self, deadline: Instant, one_shot: bool) -> usize {
        let _drive = DriveGuard::enter(self.id);
        let mut executed = 0;
        loop {
            if self.stopped.load(Ordering::Acquire) {
                return executed;
            }
            if Instant::now() >= deadline {
                // The elapsed deadline acts as an internal stop(): the
                // reactor is left stopped until the caller restarts it. A
                // work guard only prevents the early out-of-work return, not
                // this transition.
                self.stopped.store(true, Ordering::Release);
                return executed;
            }
            if let Some(task) = self.queue.pop() {
                task();
                executed += 1;
                if one_shot {
                    return executed;
                }
                continue;
            }
            if self.outstanding_work.load(Ordering::Acquire) == 0 {
                // Queue drained with no work guard: the loop is done until
                // someone calls restart().
                self.stopped.store(true, Ordering::Release);
                return executed;
            }
            let now = Instant::now();
            let guard = self.mutex.lock().expect("reactor lock poisoned");
            if self.queue.is_empty()
                && !self.stopped.load(Ordering::Acquire)
                && self.outstanding_work.load(Ordering::Acquire) > 0
            {
                let _ = self
                    .condvar
                    .wait_timeout(guard, deadline.saturating_duration_since(now))
                    .expect("reactor lock poisoned");
            }
        }
    }

    fn notify_all(&self) {
        let _guard = self.mutex.lock().expect("reactor lock poisoned");
        self.condvar.notify_all();
    }
}

impl Default for QueueReactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reactor for QueueReactor {
    fn post(&self, task: Task) {
        self.queue.push(task);
        let _guard = self.mutex.lock().expect("reactor lock poisoned");
        self.condvar.notify_one();
    }

    fn dispatch(&self, task: Task) {
        if self.running_in_this_thread() {
            task();
        } else {
            self.post(task);
        }
    }

    fn run_for(&self, duration: Duration) -> usize {
        self.run_until(Instant::now() + duration, false)
    }

    fn run_one_for(&self, duration: Duration) -> usize {
        self.run_until(Instant::now() + duration, true)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.notify_all();
    }

    fn stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    fn restart(&self) {
        self.stopped.store(false, Ordering::Release);
    }

    fn work_started(&self) {
        self.outstanding_work.fetch_add(1, Ordering::AcqRel);
    }

    fn work_finished(&self) {
        if self.outstanding_work.fetch_sub(1, Ordering::AcqRel) == 1 {
            // Last guard released: wake parked drivers so they can observe
            // the out-of-work state.
            self.notify_all();
        }
    }
}
