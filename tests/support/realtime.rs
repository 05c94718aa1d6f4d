//! Helpers for driving a [`ConnectionManager`] under paused time.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use upsdash::config::RealtimeConfig;
use upsdash::realtime::ConnectionManager;
use upsdash::testkit;
use upsdash::testkit::transport::TransportHarness;

/// Polling step. Small next to the 5 s retry and 25 s heartbeat periods.
pub const TICK: Duration = Duration::from_millis(10);

/// A manager wired to a fresh harness with production timings.
pub fn manager() -> (ConnectionManager, TransportHarness) {
    manager_with(TransportHarness::new(), &testkit::config::realtime())
}

pub fn manager_with(
    harness: TransportHarness,
    config: &RealtimeConfig,
) -> (ConnectionManager, TransportHarness) {
    let manager = ConnectionManager::new(config, harness.factory()).expect("inside runtime");
    (manager, harness)
}

/// Poll `condition` every [`TICK`] until it holds, returning the time it
/// took. Panics after `within`.
pub async fn wait_until(within: Duration, mut condition: impl FnMut() -> bool) -> Duration {
    let start = Instant::now();
    loop {
        if condition() {
            return start.elapsed();
        }
        assert!(
            start.elapsed() <= within,
            "condition not met within {within:?}"
        );
        sleep(TICK).await;
    }
}

/// Let spawned tasks run without moving the clock meaningfully.
pub async fn settle() {
    sleep(TICK).await;
}
