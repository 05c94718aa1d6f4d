//! Periodic liveness probe.
//!
//! The probe is fire-and-forget. A missing reply is not treated as a
//! failure; the transport's own error/close signalling does that job.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Sends a probe token on a fixed period while a connection is open.
///
/// At most one probe timer exists at a time.
pub struct HeartbeatScheduler {
    period: Duration,
    probe: String,
    runtime: Handle,
    task: Option<JoinHandle<()>>,
}

impl HeartbeatScheduler {
    /// A stopped scheduler sending `probe` every `period` once started.
    pub fn new(period: Duration, probe: impl Into<String>, runtime: Handle) -> Self {
        Self {
            period,
            probe: probe.into(),
            runtime,
            task: None,
        }
    }

    /// True while a probe timer is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start probing through `outbound`. The first probe goes out one period
    /// after the call.
    ///
    /// Returns `false` and changes nothing if a timer is already running.
    pub fn start(&mut self, outbound: mpsc::Sender<String>) -> bool {
        if self.is_running() {
            return false;
        }

        let period = self.period;
        let probe = self.probe.clone();
        self.task = Some(self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match outbound.try_send(probe.clone()) {
                    Ok(()) => trace!("Heartbeat probe queued"),
                    Err(TrySendError::Full(_)) => {
                        debug!("Outbound queue full, skipping heartbeat probe");
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!("Session gone, heartbeat exiting");
                        break;
                    }
                }
            }
        }));
        debug!(period_ms = period.as_millis() as u64, "Heartbeat started");
        true
    }

    /// Cancel the probe timer. Safe to call when not running.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                debug!("Heartbeat stopped");
                true
            }
            None => false,
        }
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn scheduler() -> HeartbeatScheduler {
        HeartbeatScheduler::new(Duration::from_secs(25), "ping", Handle::current())
    }

    fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(probe) = rx.try_recv() {
            out.push(probe);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn probes_on_fixed_period() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut heartbeat = scheduler();
        assert!(heartbeat.start(tx));

        sleep(Duration::from_secs(24)).await;
        assert!(drain(&mut rx).is_empty());

        sleep(Duration::from_millis(51_100)).await;
        assert_eq!(drain(&mut rx), vec!["ping", "ping", "ping"]);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_does_not_stack_timers() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut heartbeat = scheduler();
        assert!(heartbeat.start(tx.clone()));
        assert!(!heartbeat.start(tx.clone()));
        assert!(heartbeat.is_running());

        sleep(Duration::from_millis(25_100)).await;
        assert_eq!(drain(&mut rx), vec!["ping"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_probe() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut heartbeat = scheduler();
        heartbeat.start(tx);
        assert!(heartbeat.stop());
        assert!(!heartbeat.is_running());
        assert!(!heartbeat.stop());

        sleep(Duration::from_secs(60)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn exits_when_session_is_gone() {
        let (tx, rx) = mpsc::channel(8);
        let mut heartbeat = scheduler();
        heartbeat.start(tx);
        drop(rx);

        sleep(Duration::from_millis(25_100)).await;
        assert!(!heartbeat.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_runs_one_timer() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut heartbeat = scheduler();
        heartbeat.start(tx.clone());
        heartbeat.stop();
        assert!(heartbeat.start(tx));

        sleep(Duration::from_millis(25_100)).await;
        assert_eq!(drain(&mut rx), vec!["ping"]);
    }
}
