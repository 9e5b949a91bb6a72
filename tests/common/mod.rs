//! Shared helpers for the e2e suites.

use std::sync::Once;
use std::time::{Duration, Instant};

static INIT_LOGGING: Once = Once::new();

/// Initializes tracing output for tests, once per process.
///
/// Set `RUST_LOG` to see executor logs while running with `--nocapture`.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Polls `condition` until it holds or `timeout` elapses.
#[allow(dead_code)]
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
