//! Shared helpers for `taskplan` integration tests.

pub mod builders;
pub mod fake_executor;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for one engine run in tests. On Tokio's paused clock this is
/// virtual time, so a hung run fails fast instead of blocking the suite.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// Install a per-test tracing subscriber once.
///
/// Defaults to `taskplan=debug` so engine decisions show up in the output of
/// a failing test; `TASKPLAN_LOG` overrides the filter.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("TASKPLAN_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn,taskplan=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `run`, failing the test if it does not finish within [`RUN_TIMEOUT`].
pub async fn with_timeout<F, T>(run: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(RUN_TIMEOUT, run).await {
        Ok(out) => out,
        Err(_) => panic!("run did not finish within {RUN_TIMEOUT:?}"),
    }
}
