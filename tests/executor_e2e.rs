//! End-to-end scenarios for the adaptive executor.
//!
//! Each test scales the production timings down through `ServerOptions` so
//! the pool's control loop can be observed in milliseconds rather than
//! seconds. Assertions poll with generous deadlines; none of them depend on
//! a particular interleaving beyond what the executor guarantees.
//!
//! ```bash
//! cargo test --test executor_e2e -- --nocapture
//! ```

mod common;
use common::{init_test_logging, wait_until};

use adaptix::{
    AdaptiveExecutor, ExecutorError, Options, QueueReactor, Reactor, ScheduleFlags, ServerOptions,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn fixture(reserved: i64, run_time: Duration) -> (AdaptiveExecutor, Arc<ServerOptions>) {
    init_test_logging();
    let options = Arc::new(ServerOptions::new());
    options.set_reserved_threads(reserved);
    options.set_worker_thread_run_time(run_time);
    options.set_run_time_jitter(0);
    options.set_stuck_thread_timeout(Duration::from_millis(50));
    options.set_max_queue_latency(Duration::from_micros(200));
    let reactor = Arc::new(QueueReactor::new());
    let executor = AdaptiveExecutor::new(
        reactor as Arc<dyn Reactor>,
        Arc::clone(&options) as Arc<dyn Options>,
    );
    (executor, options)
}

/// S1: a cold start spawns the reserve and nothing else.
#[test]
fn cold_start_reaches_the_reserve_and_stays_there() {
    let (executor, _options) = fixture(2, Duration::from_millis(100));
    executor.start().expect("start");

    assert!(wait_until(Duration::from_millis(500), || {
        executor.stats().threads_running == 2
    }));

    // A few controller rounds later the pool is unchanged: no tasks, no
    // growth, no retirement below the reserve.
    thread::sleep(Duration::from_millis(300));
    let stats = executor.stats();
    assert_eq!(stats.threads_running, 2);
    assert_eq!(stats.threads_in_use, 0);
    assert_eq!(stats.tasks_queued, 0);
    assert_eq!(stats.total_queued, 0);

    executor.shutdown(Duration::from_secs(5)).expect("shutdown");
}

/// S2: steady light load is absorbed by the reserve without growth.
#[test]
fn steady_load_executes_everything_on_the_reserve() {
    let (executor, _options) = fixture(2, Duration::from_millis(100));
    executor.start().expect("start");

    let total: u64 = 200;
    for _ in 0..total {
        executor
            .schedule(
                || thread::sleep(Duration::from_millis(1)),
                ScheduleFlags::NONE,
            )
            .expect("schedule");
        thread::sleep(Duration::from_millis(2));
    }

    assert!(wait_until(Duration::from_secs(10), || {
        executor.stats().total_executed == total
    }));
    assert!(wait_until(Duration::from_secs(3), || {
        executor.stats().threads_running == 2
    }));
    let stats = executor.stats();
    assert_eq!(stats.total_queued, total);
    assert_eq!(stats.tasks_queued, 0);

    executor.shutdown(Duration::from_secs(5)).expect("shutdown");
}

/// S3: a burst starves the pool, the controller grows it, and the extra
/// workers retire once the burst drains.
#[test]
fn burst_grows_the_pool_then_retires_back_to_the_reserve() {
    let (executor, _options) = fixture(2, Duration::from_millis(100));
    executor.start().expect("start");
    assert!(wait_until(Duration::from_millis(500), || {
        executor.stats().threads_running == 2
    }));

    let total: u64 = 16;
    for _ in 0..total {
        executor
            .schedule(
                || thread::sleep(Duration::from_millis(100)),
                ScheduleFlags::NONE,
            )
            .expect("schedule");
    }

    assert!(
        wait_until(Duration::from_secs(5), || {
            executor.stats().threads_running >= 3
        }),
        "controller never grew the pool: {:?}",
        executor.stats()
    );

    // Invariants hold at every sampled point while the burst drains.
    assert!(wait_until(Duration::from_secs(10), || {
        let stats = executor.stats();
        assert!(stats.threads_in_use <= stats.threads_running);
        assert!(stats.total_time_executing_micros <= stats.total_time_running_micros);
        stats.total_executed == total
    }));

    // After the drain and a couple of run slices, the extras are gone.
    assert!(
        wait_until(Duration::from_secs(10), || {
            executor.stats().threads_running == 2
        }),
        "extra workers never retired: {:?}",
        executor.stats()
    );

    executor.shutdown(Duration::from_secs(5)).expect("shutdown");
}

/// S4: when every worker is blocked and nothing gets scheduled, the
/// controller injects the reserve in one step.
#[test]
fn stuck_pool_gets_reserve_injection() {
    let (executor, _options) = fixture(2, Duration::from_millis(300));
    executor.start().expect("start");
    assert!(wait_until(Duration::from_millis(500), || {
        executor.stats().threads_running == 2
    }));

    let release = Arc::new(AtomicBool::new(false));
    for _ in 0..2 {
        let release = Arc::clone(&release);
        executor
            .schedule(
                move || {
                    while !release.load(Ordering::Relaxed) {
                        thread::sleep(Duration::from_millis(1));
                    }
                },
                ScheduleFlags::NONE,
            )
            .expect("schedule blocking task");
    }

    assert!(wait_until(Duration::from_secs(2), || {
        executor.stats().threads_in_use == 2
    }));

    // No further schedules: after the stuck timeout the controller starts
    // reservedThreads() additional workers in one step.
    assert!(
        wait_until(Duration::from_secs(3), || {
            executor.stats().threads_running >= 4
        }),
        "stuck detection never fired: {:?}",
        executor.stats()
    );

    release.store(true, Ordering::Relaxed);
    assert!(wait_until(Duration::from_secs(5), || {
        executor.stats().total_executed == 2
    }));

    executor.shutdown(Duration::from_secs(10)).expect("shutdown");
}

/// S5: MAY_RECURSE runs inline below the recursion limit and degrades to a
/// post at the limit.
#[test]
fn recursion_is_clamped_at_the_configured_depth() {
    let (executor, options) = fixture(2, Duration::from_millis(100));
    options.set_recursion_limit(3);
    executor.start().expect("start");

    let handle = executor.handle();
    let depth2_inline = Arc::new(AtomicBool::new(false));
    let depth3_inline = Arc::new(AtomicBool::new(true));
    let outer_done = Arc::new(AtomicBool::new(false));

    {
        let handle_outer = handle.clone();
        let depth2_inline = Arc::clone(&depth2_inline);
        let depth3_inline = Arc::clone(&depth3_inline);
        let outer_done = Arc::clone(&outer_done);
        executor
            .schedule(
                move || {
                    // Depth 1: a MAY_RECURSE submission dispatches inline.
                    let inner_ran = Arc::new(AtomicBool::new(false));
                    {
                        let handle_inner = handle_outer.clone();
                        let inner_ran = Arc::clone(&inner_ran);
                        let depth3_inline = Arc::clone(&depth3_inline);
                        handle_outer
                            .schedule(
                                move || {
                                    inner_ran.store(true, Ordering::Relaxed);
                                    // Depth 2: the next level would reach the
                                    // limit, so this submission is posted.
                                    let innermost_ran = Arc::new(AtomicBool::new(false));
                                    {
                                        let innermost_ran = Arc::clone(&innermost_ran);
                                        handle_inner
                                            .schedule(
                                                move || {
                                                    innermost_ran.store(true, Ordering::Relaxed);
                                                },
                                                ScheduleFlags::MAY_RECURSE,
                                            )
                                            .expect("schedule depth 3");
                                    }
                                    depth3_inline
                                        .store(innermost_ran.load(Ordering::Relaxed), Ordering::Relaxed);
                                },
                                ScheduleFlags::MAY_RECURSE,
                            )
                            .expect("schedule depth 2");
                    }
                    depth2_inline.store(inner_ran.load(Ordering::Relaxed), Ordering::Relaxed);
                    outer_done.store(true, Ordering::Release);
                },
                ScheduleFlags::NONE,
            )
            .expect("schedule outer");
    }

    assert!(wait_until(Duration::from_secs(5), || {
        outer_done.load(Ordering::Acquire)
    }));
    assert!(
        depth2_inline.load(Ordering::Relaxed),
        "depth-2 submission should have run inline"
    );
    assert!(
        !depth3_inline.load(Ordering::Relaxed),
        "depth-3 submission should have been posted"
    );

    // The posted innermost task still runs, just not inline.
    assert!(wait_until(Duration::from_secs(5), || {
        executor.stats().total_executed == 3
    }));

    executor.shutdown(Duration::from_secs(5)).expect("shutdown");
}

/// S6: a deferred submission is counted separately and does not provoke
/// pool growth.
#[test]
fn deferred_task_does_not_grow_the_pool() {
    let (executor, _options) = fixture(2, Duration::from_millis(100));
    executor.start().expect("start");
    assert!(wait_until(Duration::from_millis(500), || {
        executor.stats().threads_running == 2
    }));

    let ran = Arc::new(AtomicBool::new(false));
    {
        let ran = Arc::clone(&ran);
        executor
            .schedule(
                move || {
                    ran.store(true, Ordering::Relaxed);
                },
                ScheduleFlags::DEFERRED,
            )
            .expect("schedule deferred");
    }

    assert!(wait_until(Duration::from_secs(5), || {
        ran.load(Ordering::Relaxed) && executor.stats().deferred_tasks_queued == 0
    }));

    // Several controller rounds later the pool is still just the reserve.
    thread::sleep(Duration::from_millis(300));
    let stats = executor.stats();
    assert_eq!(stats.threads_running, 2);
    assert_eq!(stats.tasks_queued, 0);

    executor.shutdown(Duration::from_secs(5)).expect("shutdown");
}

/// Counter bookkeeping across a mixed workload: every successful schedule is
/// queued once and executed once.
#[test]
fn totals_match_the_number_of_submissions() {
    let (executor, _options) = fixture(2, Duration::from_millis(100));
    executor.start().expect("start");

    let total: u64 = 64;
    let executed = Arc::new(AtomicU64::new(0));
    for i in 0..total {
        let flags = if i % 4 == 0 {
            ScheduleFlags::DEFERRED
        } else {
            ScheduleFlags::NONE
        };
        let executed = Arc::clone(&executed);
        executor
            .schedule(
                move || {
                    executed.fetch_add(1, Ordering::Relaxed);
                },
                flags,
            )
            .expect("schedule");
    }

    assert!(wait_until(Duration::from_secs(10), || {
        executor.stats().total_executed == total
    }));
    let stats = executor.stats();
    assert_eq!(stats.total_queued, total);
    assert_eq!(executed.load(Ordering::Relaxed), total);
    assert_eq!(stats.tasks_queued, 0);
    assert_eq!(stats.deferred_tasks_queued, 0);
    assert!(stats.total_time_executing_micros <= stats.total_time_running_micros);

    executor.shutdown(Duration::from_secs(5)).expect("shutdown");
}

/// Shutdown with a worker wedged in a long task reports the timeout.
#[test]
fn shutdown_times_out_on_a_wedged_worker() {
    let (executor, _options) = fixture(1, Duration::from_millis(100));
    executor.start().expect("start");

    executor
        .schedule(
            || thread::sleep(Duration::from_secs(2)),
            ScheduleFlags::NONE,
        )
        .expect("schedule");
    assert!(wait_until(Duration::from_secs(2), || {
        executor.stats().threads_in_use == 1
    }));

    assert_eq!(
        executor.shutdown(Duration::from_millis(50)),
        Err(ExecutorError::ExceededTimeLimit)
    );
    // The task is not aborted; the worker drains on its own afterwards.
    assert!(wait_until(Duration::from_secs(5), || {
        executor.stats().threads_running == 0
    }));
}

/// Submissions after shutdown are rejected and the pool stays down.
#[test]
fn schedule_after_shutdown_is_rejected() {
    let (executor, _options) = fixture(2, Duration::from_millis(100));
    executor.start().expect("start");
    executor.shutdown(Duration::from_secs(5)).expect("shutdown");

    assert_eq!(
        executor.schedule(|| {}, ScheduleFlags::NONE),
        Err(ExecutorError::ShutdownInProgress)
    );
    assert_eq!(executor.stats().threads_running, 0);
    // Second shutdown is an immediate no-op.
    executor.shutdown(Duration::from_millis(1)).expect("second");
}
