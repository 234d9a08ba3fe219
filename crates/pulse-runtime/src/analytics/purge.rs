use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulse_core::Purger;
use tokio::sync::watch;

/// Periodically purges the analytics collection while this instance leads.
pub struct PurgeLoop {
    purger: Arc<dyn Purger>,
    /// `None` when purging is disabled.
    interval: Option<Duration>,
    is_leader: Arc<AtomicBool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl PurgeLoop {
    pub fn new(
        purger: Arc<dyn Purger>,
        interval: Option<Duration>,
        is_leader: Arc<AtomicBool>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            purger,
            interval,
            is_leader,
            shutdown_rx,
        }
    }

    /// Run until shutdown. Returns at once when purging is disabled.
    ///
    /// Leadership is the flag from the last election tick, so a purge may run
    /// up to one election interval after leadership was lost.
    pub async fn run(&self) {
        let Some(interval) = self.interval else {
            tracing::warn!(
                "Analytics purge turned off, you are responsible for store maintenance"
            );
            return;
        };

        tracing::debug!(interval_secs = interval.as_secs(), "Started analytics purge loop");
        let mut shutdown_rx = self.shutdown_rx.clone();

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            if self.is_leader.load(Ordering::SeqCst) {
                tracing::debug!("Purging uptime analytics");
                self.purger.purge().await;
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Analytics purge loop stopped");
    }
}
