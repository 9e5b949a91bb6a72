//! The adaptive executor: admission, worker lifecycle, and the controller.
//!
//! Submitted tasks are wrapped with enter/leave accounting and handed to the
//! [`Reactor`]; a dynamically sized pool of worker threads drives the
//! reactor in bounded run slices and decides per slice whether to keep
//! going. A single controller thread watches pool-wide utilization and queue
//! starvation to grow the pool, and injects reserve threads when every
//! worker is blocked downstream.
//!
//! # Thread roles
//!
//! - **Workers** (`worker-<n>`): own per-thread accounting state, drive
//!   `run_for` / `run_one_for` under a work guard, and retire voluntarily
//!   when a slice spends less than the idle threshold executing task bodies.
//!   The reserve never retires.
//! - **Controller** (`worker-controller`): woken by starved submissions or
//!   by timeout; computes the executing/running tick ratio since its last
//!   round and spawns workers accordingly.
//!
//! Workers find their own state through a thread-local, so task wrappers do
//! no map lookups on the hot path.

use crate::clock::{ticks_to_micros, MonotonicClock, ThreadTimer, TickSource, TickTimer};
use crate::error::{ExecutorError, Result};
use crate::options::Options;
use crate::reactor::{Reactor, Task, WorkGuard};
use crate::stats::{ExecutorStats, EXECUTOR_LABEL};
use crate::util::SeededRng;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, OnceLock};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Flags modifying how a task is admitted.
///
/// Flags are orthogonal and combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleFlags(u8);

impl ScheduleFlags {
    /// No special handling.
    pub const NONE: Self = Self(0);

    /// The task may run synchronously inside the submitting worker before
    /// `schedule` returns, provided the worker is below the recursion limit.
    pub const MAY_RECURSE: Self = Self(0b01);

    /// Counted in the deferred queue-depth counter and excluded from the
    /// starvation wake of the controller.
    pub const DEFERRED: Self = Self(0b10);

    /// Returns true if every flag in `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ScheduleFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for ScheduleFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Per-worker accounting state, registered in the executor's thread list.
#[derive(Debug)]
struct ThreadState {
    id: usize,
    /// Accumulates while the worker is checked out by the reactor.
    running: ThreadTimer,
    /// Accumulates while a task body is on the stack (outermost only).
    executing: ThreadTimer,
    /// Executing ticks committed during the current run slice.
    executing_this_run: AtomicU64,
    /// Depth of nested task bodies on this worker's stack.
    recursion_depth: AtomicUsize,
}

impl ThreadState {
    fn new(id: usize, source: &Arc<dyn TickSource>) -> Self {
        Self {
            id,
            running: ThreadTimer::new(Arc::clone(source)),
            executing: ThreadTimer::new(Arc::clone(source)),
            executing_this_run: AtomicU64::new(0),
            recursion_depth: AtomicUsize::new(0),
        }
    }
}

thread_local! {
    /// The owning worker's state; `None` on non-worker threads.
    static LOCAL_THREAD_STATE: RefCell<Option<Arc<ThreadState>>> = const { RefCell::new(None) };
}

/// Which per-thread timer to aggregate.
#[derive(Debug, Clone, Copy)]
enum TimerKind {
    Running,
    Executing,
}

struct ExecutorInner {
    reactor: Arc<dyn Reactor>,
    options: Arc<dyn Options>,
    tick_source: Arc<dyn TickSource>,
    running: AtomicBool,
    threads: Mutex<Vec<Arc<ThreadState>>>,
    next_worker_id: AtomicUsize,
    threads_running: AtomicUsize,
    threads_pending: AtomicUsize,
    threads_in_use: AtomicUsize,
    tasks_queued: AtomicU64,
    deferred_tasks_queued: AtomicU64,
    total_queued: AtomicU64,
    total_executed: AtomicU64,
    total_spent_queued: AtomicU64,
    past_spent_running: AtomicU64,
    past_spent_executing: AtomicU64,
    last_schedule_timer: TickTimer,
    schedule_mutex: Mutex<()>,
    schedule_cv: Condvar,
    death_cv: Condvar,
}

impl ExecutorInner {
    fn pending_counter(&self, deferred: bool) -> &AtomicU64 {
        if deferred {
            &self.deferred_tasks_queued
        } else {
            &self.tasks_queued
        }
    }

    /// True when queued tasks outnumber free workers and no spawn is
    /// already in flight.
    fn is_starved(&self) -> bool {
        if self.threads_pending.load(Ordering::Relaxed) > 0 {
            return false;
        }
        let tasks_queued = self.tasks_queued.load(Ordering::Relaxed);
        if tasks_queued == 0 {
            return false;
        }
        let available = self
            .threads_running
            .load(Ordering::Relaxed)
            .saturating_sub(self.threads_in_use.load(Ordering::Relaxed));
        tasks_queued > available as u64
    }

    fn notify_controller(&self) {
        let _guard = self
            .schedule_mutex
            .lock()
            .expect("schedule signal lock poisoned");
        self.schedule_cv.notify_one();
    }

    /// Pool-wide tick total: exited workers' contribution plus every live
    /// thread's committed-and-open time.
    fn thread_timer_total(&self, kind: TimerKind) -> u64 {
        let mut accumulator = match kind {
            TimerKind::Running => self.past_spent_running.load(Ordering::Relaxed),
            TimerKind::Executing => self.past_spent_executing.load(Ordering::Relaxed),
        };
        let threads = self.threads.lock().expect("threads lock poisoned");
        for state in threads.iter() {
            accumulator += match kind {
                TimerKind::Running => state.running.total_time(),
                TimerKind::Executing => state.executing.total_time(),
            };
        }
        accumulator
    }
}

/// Restores accounting when a task body leaves the stack, on any exit path.
struct TaskAccounting<'a> {
    inner: &'a ExecutorInner,
    state: &'a ThreadState,
}

impl Drop for TaskAccounting<'_> {
    fn drop(&mut self) {
        if self.state.recursion_depth.fetch_sub(1, Ordering::Relaxed) == 1 {
            let interval = self.state.executing.mark_stopped();
            self.state
                .executing_this_run
                .fetch_add(interval, Ordering::Relaxed);
            self.inner.threads_in_use.fetch_sub(1, Ordering::Relaxed);
        }
        self.inner.total_executed.fetch_add(1, Ordering::Relaxed);
    }
}

/// The wrapper body every submitted task runs inside: queue-time capture,
/// outermost-only executing marks, and the in-use gauge.
fn run_wrapped<F: FnOnce()>(inner: &ExecutorInner, deferred: bool, schedule_ticks: u64, task: F) {
    let state = LOCAL_THREAD_STATE
        .with(|slot| slot.borrow().clone())
        .expect("task executed off an executor worker thread");

    inner.pending_counter(deferred).fetch_sub(1, Ordering::Relaxed);
    let start = inner.tick_source.ticks();
    inner
        .total_spent_queued
        .fetch_add(start.saturating_sub(schedule_ticks), Ordering::Relaxed);

    if state.recursion_depth.fetch_add(1, Ordering::Relaxed) == 0 {
        state.executing.mark_running();
        inner.threads_in_use.fetch_add(1, Ordering::Relaxed);
    }
    let _accounting = TaskAccounting {
        inner,
        state: &state,
    };

    task();
}

fn schedule_task(
    inner: &Arc<ExecutorInner>,
    task: Task,
    flags: ScheduleFlags,
) -> Result<()> {
    let schedule_ticks = inner.tick_source.ticks();
    let deferred = flags.contains(ScheduleFlags::DEFERRED);
    inner.pending_counter(deferred).fetch_add(1, Ordering::Relaxed);

    if !inner.running.load(Ordering::Acquire) {
        // The eager increment above is accepted drift: queue-depth counters
        // are statistics, not queue invariants.
        return Err(ExecutorError::ShutdownInProgress);
    }

    let wrapped: Task = {
        let inner = Arc::clone(inner);
        Box::new(move || run_wrapped(&inner, deferred, schedule_ticks, task))
    };

    // Dispatching may run the wrapper immediately on this thread when we are
    // a worker below the recursion limit; posting always defers it.
    let may_recurse = flags.contains(ScheduleFlags::MAY_RECURSE)
        && LOCAL_THREAD_STATE.with(|slot| {
            slot.borrow().as_ref().is_some_and(|state| {
                state.recursion_depth.load(Ordering::Relaxed) + 1 < inner.options.recursion_limit()
            })
        });
    if may_recurse {
        inner.reactor.dispatch(wrapped);
    } else {
        inner.reactor.post(wrapped);
    }

    inner.last_schedule_timer.reset();
    inner.total_queued.fetch_add(1, Ordering::Relaxed);

    // Deferred tasks never count against starvation avoidance.
    if !deferred && inner.is_starved() {
        inner.notify_controller();
    }

    Ok(())
}

/// Runs the worker teardown sequence on every exit path.
struct WorkerExit {
    inner: Arc<ExecutorInner>,
    state: Arc<ThreadState>,
    still_pending: bool,
}

impl Drop for WorkerExit {
    fn drop(&mut self) {
        if self.still_pending {
            self.inner.threads_pending.fetch_sub(1, Ordering::Relaxed);
        }
        self.inner.threads_running.fetch_sub(1, Ordering::Relaxed);
        self.inner
            .past_spent_running
            .fetch_add(self.state.running.total_time(), Ordering::Relaxed);
        self.inner
            .past_spent_executing
            .fetch_add(self.state.executing.total_time(), Ordering::Relaxed);
        {
            let mut threads = self.inner.threads.lock().expect("threads lock poisoned");
            threads.retain(|state| state.id != self.state.id);
        }
        self.inner.death_cv.notify_one();
        LOCAL_THREAD_STATE.with(|slot| slot.borrow_mut().take());
    }
}

fn start_worker_thread(inner: &Arc<ExecutorInner>) {
    let id = inner.next_worker_id.fetch_add(1, Ordering::Relaxed);
    let state = Arc::new(ThreadState::new(id, &inner.tick_source));
    {
        let mut threads = inner.threads.lock().expect("threads lock poisoned");
        threads.push(Arc::clone(&state));
        inner.threads_pending.fetch_add(1, Ordering::Relaxed);
        inner.threads_running.fetch_add(1, Ordering::Relaxed);
    }

    let launch = thread::Builder::new().name(format!("worker-{id}")).spawn({
        let inner = Arc::clone(inner);
        move || worker_thread_routine(&inner, state)
    });

    if let Err(error) = launch {
        // No retry here; the controller re-evaluates on its next tick.
        warn!(%error, "failed to launch new worker thread");
        let mut threads = inner.threads.lock().expect("threads lock poisoned");
        inner.threads_pending.fetch_sub(1, Ordering::Relaxed);
        inner.threads_running.fetch_sub(1, Ordering::Relaxed);
        threads.retain(|state| state.id != id);
    }
}

fn worker_thread_routine(inner: &Arc<ExecutorInner>, state: Arc<ThreadState>) {
    LOCAL_THREAD_STATE.with(|slot| *slot.borrow_mut() = Some(Arc::clone(&state)));
    debug!(worker = state.id, "started new worker thread");

    let mut exit = WorkerExit {
        inner: Arc::clone(inner),
        state: Arc::clone(&state),
        still_pending: true,
    };

    let jitter_ms = thread_jitter(inner.options.as_ref());

    while inner.running.load(Ordering::Acquire) {
        let run_ms = inner.options.worker_thread_run_time().as_millis() as i64 + jitter_ms;
        assert!(run_ms > 0, "worker run slice must be positive");
        let run_time = Duration::from_millis(run_ms as u64);

        state.executing_this_run.store(0, Ordering::Relaxed);

        let still_pending = exit.still_pending;
        let slice = panic::catch_unwind(AssertUnwindSafe(|| {
            // The work guard keeps run_* from returning early on a cold
            // queue; scoping it to the slice lets the worker exit between
            // slices.
            let _work = WorkGuard::new(inner.reactor.as_ref());
            state.running.mark_running();
            // A pending thread runs one task at most so the controller sees
            // fresh supply quickly.
            if still_pending {
                inner.reactor.run_one_for(run_time);
            } else {
                inner.reactor.run_for(run_time);
            }
            // A timed-out or drained run leaves the reactor stopped until
            // restarted; without this a cold start with no submitted work
            // would wedge the pool after the first slice. Skipped when
            // shutting down so stop() keeps every driver unblocked.
            if inner.reactor.stopped() && inner.running.load(Ordering::Acquire) {
                inner.reactor.restart();
            }
        }));

        if slice.is_err() {
            warn!(
                worker = state.id,
                "panic escaped worker thread; starting replacement worker"
            );
            start_worker_thread(inner);
            break;
        }

        let spent_running = state.running.mark_stopped();

        if exit.still_pending {
            // First completed slice: report in so the controller can keep
            // growing if it needs to.
            inner.threads_pending.fetch_sub(1, Ordering::Relaxed);
            exit.still_pending = false;
        } else if inner.threads_running.load(Ordering::Relaxed) > inner.options.reserved_threads()
            && spent_running > 0
        {
            let executing = state.executing_this_run.load(Ordering::Relaxed);
            let pct_executing = (executing as f64 / spent_running as f64) * 100.0;
            debug_assert!(pct_executing <= 100.0);
            if (pct_executing as u32) < inner.options.idle_pct_threshold() {
                debug!(
                    worker = state.id,
                    pct_executing = pct_executing as u32,
                    run_time_ms = run_ms,
                    "worker spent too little of its run slice executing; exiting"
                );
                break;
            }
        }
    }
}

/// Resets the controller's round timer when an iteration exits.
struct RoundReset<'a> {
    timer: &'a TickTimer,
}

impl Drop for RoundReset<'_> {
    fn drop(&mut self) {
        self.timer.reset();
    }
}

fn controller_thread_routine(inner: &Arc<ExecutorInner>) {
    let mut last_spent_executing = inner.thread_timer_total(TimerKind::Executing);
    let mut last_spent_running = inner.thread_timer_total(TimerKind::Running);
    let since_last_round = TickTimer::new(Arc::clone(&inner.tick_source));

    while inner.running.load(Ordering::Acquire) {
        let _round = RoundReset {
            timer: &since_last_round,
        };

        {
            let guard = inner
                .schedule_mutex
                .lock()
                .expect("schedule signal lock poisoned");
            // The wake is advisory; a spurious wake just runs an idempotent
            // round early.
            let _ = inner
                .schedule_cv
                .wait_timeout(guard, inner.options.stuck_thread_timeout())
                .expect("schedule signal lock poisoned");
        }

        if !inner.running.load(Ordering::Acquire) {
            break;
        }

        let utilization_pct = {
            let spent_executing = inner.thread_timer_total(TimerKind::Executing);
            let spent_running = inner.thread_timer_total(TimerKind::Running);
            let diff_executing = spent_executing.saturating_sub(last_spent_executing);
            let diff_running = spent_running.saturating_sub(last_spent_running);
            if spent_running == 0 || diff_running == 0 {
                0.0
            } else {
                last_spent_executing = spent_executing;
                last_spent_running = spent_running;
                (diff_executing as f64 / diff_running as f64) * 100.0
            }
        };

        let stuck_timeout = inner.options.stuck_thread_timeout();
        if since_last_round.since_start() >= stuck_timeout {
            // The round timed out: the pool is idle or stuck. When every
            // running worker is busy and nothing has been scheduled for a
            // full timeout, assume workers are blocked downstream and inject
            // the reserve to unblock the pool.
            let since_last_schedule = inner.last_schedule_timer.since_start();
            if inner.threads_in_use.load(Ordering::Relaxed)
                == inner.threads_running.load(Ordering::Relaxed)
                && since_last_schedule >= stuck_timeout
            {
                warn!(
                    reserve = inner.options.reserved_threads(),
                    "detected blocked worker threads; starting reserve threads to unblock the executor"
                );
                for _ in 0..inner.options.reserved_threads() {
                    start_worker_thread(inner);
                }
            }
            continue;
        }

        let threads_running = inner.threads_running.load(Ordering::Relaxed);
        let reserved = inner.options.reserved_threads();
        if threads_running < reserved {
            info!(
                count = reserved - threads_running,
                "replenishing reserved worker threads"
            );
            while inner.threads_running.load(Ordering::Relaxed) < inner.options.reserved_threads() {
                start_worker_thread(inner);
            }
        }

        // Below the idle threshold the pool is not saturated; bursty but
        // productive pools are not inflated.
        if utilization_pct < f64::from(inner.options.idle_pct_threshold()) {
            continue;
        }

        // Give pending spawns a latency budget to become running before
        // reacting again, capped by the stuck timeout.
        loop {
            thread::sleep(inner.options.max_queue_latency());
            if inner.threads_pending.load(Ordering::Relaxed) == 0
                || since_last_round.since_start() >= stuck_timeout
            {
                break;
            }
        }

        if inner.is_starved() {
            info!("starting worker thread to avoid starvation");
            start_worker_thread(inner);
        }
    }
}

/// Draws this worker's slice jitter from the process-wide generator.
fn thread_jitter(options: &dyn Options) -> i64 {
    let magnitude = options.run_time_jitter() as i64;
    if magnitude == 0 {
        return 0;
    }
    static JITTER_RNG: OnceLock<Mutex<SeededRng>> = OnceLock::new();
    let mut rng = JITTER_RNG
        .get_or_init(|| Mutex::new(SeededRng::from_entropy()))
        .lock()
        .expect("jitter rng lock poisoned");
    let jitter = rng.next_signed_up_to(magnitude);
    if jitter > options.worker_thread_run_time().as_millis() as i64 {
        0
    } else {
        jitter
    }
}

/// Adaptive task executor over a shared reactor.
///
/// Created stopped; [`start`](Self::start) launches the controller and the
/// reserved workers, [`shutdown`](Self::shutdown) drains the pool within a
/// time limit. [`handle`](Self::handle) returns a cloneable submission
/// handle for collaborators such as per-connection state machines.
pub struct AdaptiveExecutor {
    inner: Arc<ExecutorInner>,
    controller: Mutex<Option<thread::JoinHandle<()>>>,
}

impl fmt::Debug for AdaptiveExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveExecutor")
            .field("running", &self.inner.running.load(Ordering::Relaxed))
            .field(
                "threads_running",
                &self.inner.threads_running.load(Ordering::Relaxed),
            )
            .field(
                "threads_in_use",
                &self.inner.threads_in_use.load(Ordering::Relaxed),
            )
            .field(
                "tasks_queued",
                &self.inner.tasks_queued.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl AdaptiveExecutor {
    /// Creates a stopped executor over `reactor`, configured by `options`.
    #[must_use]
    pub fn new(reactor: Arc<dyn Reactor>, options: Arc<dyn Options>) -> Self {
        Self::with_tick_source(reactor, options, Arc::new(MonotonicClock::new()))
    }

    /// Creates a stopped executor with an explicit tick source.
    #[must_use]
    pub fn with_tick_source(
        reactor: Arc<dyn Reactor>,
        options: Arc<dyn Options>,
        tick_source: Arc<dyn TickSource>,
    ) -> Self {
        let last_schedule_timer = TickTimer::new(Arc::clone(&tick_source));
        Self {
            inner: Arc::new(ExecutorInner {
                reactor,
                options,
                tick_source,
                running: AtomicBool::new(false),
                threads: Mutex::new(Vec::new()),
                next_worker_id: AtomicUsize::new(0),
                threads_running: AtomicUsize::new(0),
                threads_pending: AtomicUsize::new(0),
                threads_in_use: AtomicUsize::new(0),
                tasks_queued: AtomicU64::new(0),
                deferred_tasks_queued: AtomicU64::new(0),
                total_queued: AtomicU64::new(0),
                total_executed: AtomicU64::new(0),
                total_spent_queued: AtomicU64::new(0),
                past_spent_running: AtomicU64::new(0),
                past_spent_executing: AtomicU64::new(0),
                last_schedule_timer,
                schedule_mutex: Mutex::new(()),
                schedule_cv: Condvar::new(),
                death_cv: Condvar::new(),
            }),
            controller: Mutex::new(None),
        }
    }

    /// Returns true while the executor accepts submissions.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Returns a cloneable submission handle.
    #[must_use]
    pub fn handle(&self) -> ExecutorHandle {
        ExecutorHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Starts the controller thread and the reserved workers.
    ///
    /// # Panics
    ///
    /// Panics if called while already running, or if the controller thread
    /// cannot be spawned.
    pub fn start(&self) -> Result<()> {
        assert!(
            !self.inner.running.load(Ordering::Acquire),
            "executor already started"
        );
        self.inner.running.store(true, Ordering::Release);

        let controller = {
            let inner = Arc::clone(&self.inner);
            thread::Builder::new()
                .name("worker-controller".to_string())
                .spawn(move || controller_thread_routine(&inner))
                .expect("failed to spawn controller thread")
        };
        *self
            .controller
            .lock()
            .expect("controller handle lock poisoned") = Some(controller);

        for _ in 0..self.inner.options.reserved_threads() {
            start_worker_thread(&self.inner);
        }
        Ok(())
    }

    /// Submits a task. See [`ScheduleFlags`] for the admission variants.
    ///
    /// Returns [`ExecutorError::ShutdownInProgress`] when the executor is
    /// not running.
    pub fn schedule<F>(&self, task: F, flags: ScheduleFlags) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        schedule_task(&self.inner, Box::new(task), flags)
    }

    /// Stops accepting work, joins the controller, stops the reactor, and
    /// waits up to `timeout` for every worker to exit.
    ///
    /// In-flight task bodies are not aborted; they run to completion. A
    /// second call returns `Ok` immediately.
    pub fn shutdown(&self, timeout: Duration) -> Result<()> {
        if !self.inner.running.load(Ordering::Acquire) {
            return Ok(());
        }
        self.inner.running.store(false, Ordering::Release);
        self.inner.notify_controller();

        if let Some(controller) = self
            .controller
            .lock()
            .expect("controller handle lock poisoned")
            .take()
        {
            if controller.join().is_err() {
                warn!("controller thread panicked during shutdown");
            }
        }

        let threads = self.inner.threads.lock().expect("threads lock poisoned");
        self.inner.reactor.stop();
        let (threads, _wait) = self
            .inner
            .death_cv
            .wait_timeout_while(threads, timeout, |threads| !threads.is_empty())
            .expect("threads lock poisoned");

        if threads.is_empty() {
            Ok(())
        } else {
            Err(ExecutorError::ExceededTimeLimit)
        }
    }

    /// Produces a point-in-time statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> ExecutorStats {
        executor_stats(&self.inner)
    }
}

impl Drop for AdaptiveExecutor {
    fn drop(&mut self) {
        if self.inner.running.load(Ordering::Acquire) {
            let _ = self.shutdown(Duration::from_secs(5));
        }
    }
}

/// Cloneable submission handle to a running executor.
#[derive(Clone)]
pub struct ExecutorHandle {
    inner: Arc<ExecutorInner>,
}

impl fmt::Debug for ExecutorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorHandle")
            .field("running", &self.inner.running.load(Ordering::Relaxed))
            .finish()
    }
}

impl ExecutorHandle {
    /// Submits a task; identical to [`AdaptiveExecutor::schedule`].
    pub fn schedule<F>(&self, task: F, flags: ScheduleFlags) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        schedule_task(&self.inner, Box::new(task), flags)
    }

    /// Produces a point-in-time statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> ExecutorStats {
        executor_stats(&self.inner)
    }
}

fn executor_stats(inner: &ExecutorInner) -> ExecutorStats {
    ExecutorStats {
        executor: EXECUTOR_LABEL,
        total_queued: inner.total_queued.load(Ordering::Relaxed),
        total_executed: inner.total_executed.load(Ordering::Relaxed),
        tasks_queued: inner.tasks_queued.load(Ordering::Relaxed),
        deferred_tasks_queued: inner.deferred_tasks_queued.load(Ordering::Relaxed),
        threads_in_use: inner.threads_in_use.load(Ordering::Relaxed),
        total_time_running_micros: ticks_to_micros(
            inner.thread_timer_total(TimerKind::Running),
            inner.tick_source.as_ref(),
        ),
        total_time_executing_micros: ticks_to_micros(
            inner.thread_timer_total(TimerKind::Executing),
            inner.tick_source.as_ref(),
        ),
        total_time_queued_micros: ticks_to_micros(
            inner.total_spent_queued.load(Ordering::Relaxed),
            inner.tick_source.as_ref(),
        ),
        threads_running: inner.threads_running.load(Ordering::Relaxed),
        threads_pending: inner.threads_pending.load(Ordering::Relaxed),
    }
}
