//! Fixed-interval reconnection.
//!
//! The realtime channel is a live view, not a delivery guarantee, so the
//! policy retries forever on a fixed interval while consumers remain
//! attached. There is no backoff and no attempt limit.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

struct PendingRetry {
    id: u64,
    task: JoinHandle<()>,
}

/// Owns the single pending reconnect timer.
pub struct ReconnectPolicy {
    interval: Duration,
    runtime: Handle,
    pending: Option<PendingRetry>,
    next_id: u64,
    /// Attempts scheduled since the last successful open.
    attempts: u32,
}

impl ReconnectPolicy {
    /// A policy with nothing pending. Timers are spawned on `runtime`.
    pub fn new(interval: Duration, runtime: Handle) -> Self {
        Self {
            interval,
            runtime,
            pending: None,
            next_id: 0,
            attempts: 0,
        }
    }

    /// Retries scheduled since the last [`reset`](Self::reset).
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// True while a retry timer is armed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedule `on_fire` to run once after the retry interval.
    ///
    /// `on_fire` receives the timer id, which must be passed to
    /// [`acknowledge`](Self::acknowledge) before acting on it. Returns
    /// `false` and schedules nothing if a retry is already pending.
    pub fn schedule_retry<F>(&mut self, on_fire: F) -> bool
    where
        F: FnOnce(u64) + Send + 'static,
    {
        if self.pending.is_some() {
            debug!("Reconnect already pending");
            return false;
        }

        self.next_id += 1;
        self.attempts = self.attempts.saturating_add(1);
        let id = self.next_id;
        let interval = self.interval;
        let task = self.runtime.spawn(async move {
            sleep(interval).await;
            on_fire(id);
        });
        self.pending = Some(PendingRetry { id, task });

        info!(
            attempt = self.attempts,
            delay_ms = interval.as_millis() as u64,
            "Reconnect scheduled"
        );
        true
    }

    /// Claim a fired timer.
    ///
    /// Returns `true` only if `id` is the pending timer, which is then
    /// cleared. A timer that was cancelled while it was firing returns
    /// `false` and must be ignored.
    pub fn acknowledge(&mut self, id: u64) -> bool {
        match &self.pending {
            Some(pending) if pending.id == id => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel the pending retry. Safe to call when nothing is pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.task.abort();
                debug!("Pending reconnect cancelled");
                true
            }
            None => false,
        }
    }

    /// Forget the attempt count after a successful open.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

impl Drop for ReconnectPolicy {
    fn drop(&mut self) {
        self.cancel();
    }
}
