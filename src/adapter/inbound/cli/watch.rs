//! Handler for the `watch` command.
//!
//! Attaches one consumer to the realtime connection and renders every
//! notification until Ctrl-C.

use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, MissedTickBehavior};
use tracing::warn;

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::backend::socket_factory;
use crate::config::Config;
use crate::error::Result;
use crate::realtime::{ConnectionManager, Notification};

/// Execute `watch`. With `once`, return after the first snapshot.
pub async fn execute(config: &Config, once: bool) -> Result<()> {
    let url = config.server.ws_url()?;
    let manager = ConnectionManager::new(&config.realtime, socket_factory(url))?;
    let mut notifications = manager.subscribe();

    output::banner(env!("CARGO_PKG_VERSION"), &config.server.base_url);

    let consumer = manager.consumer();
    let stale_after = config.realtime.stale_after();
    let mut stale_check = interval(stale_after / 2);
    stale_check.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut warned_stale = false;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                output::notice("Interrupted");
                break;
            }
            _ = stale_check.tick() => {
                let stale = manager.is_connected() && manager.is_stale(stale_after);
                if stale && !warned_stale {
                    output::stale_warning(manager.data_age());
                }
                warned_stale = stale;
            }
            received = notifications.recv() => match received {
                Ok(notification) => {
                    output::notification(&notification);
                    if once && matches!(notification, Notification::Snapshot(_)) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification receiver lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    drop(consumer);
    Ok(())
}
