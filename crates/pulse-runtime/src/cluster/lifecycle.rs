use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pulse_core::{HostSet, ProbeCallbacks, Prober, ProberSettings};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::uptime::ActiveHostSet;

/// Start/stop control of the prober, driven by leadership transitions.
///
/// Every request bumps an epoch and runs as its own task. A task applies its
/// transition only if its epoch is still the latest when it gets the prober,
/// so a stop issued right after a start can never be undone by the start
/// finishing late.
pub struct ProberLifecycle {
    prober: Arc<dyn Prober>,
    hosts: Arc<ActiveHostSet>,
    settings: ProberSettings,
    callbacks: ProbeCallbacks,
    epoch: AtomicU64,
    /// Whether the prober is actually running. Held across prober calls.
    running: Mutex<bool>,
}

impl ProberLifecycle {
    pub fn new(
        prober: Arc<dyn Prober>,
        hosts: Arc<ActiveHostSet>,
        settings: ProberSettings,
        callbacks: ProbeCallbacks,
    ) -> Self {
        Self {
            prober,
            hosts,
            settings,
            callbacks,
            epoch: AtomicU64::new(0),
            running: Mutex::new(false),
        }
    }

    /// Latest issued epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub async fn is_running(&self) -> bool {
        *self.running.lock().await
    }

    pub fn hosts(&self) -> &Arc<ActiveHostSet> {
        &self.hosts
    }

    /// Start the prober in the background. The task yields whether it
    /// changed anything.
    pub fn request_start(self: &Arc<Self>) -> JoinHandle<bool> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let this = Arc::clone(self);
        tokio::spawn(async move { this.apply(epoch, true).await })
    }

    /// Stop the prober in the background.
    pub fn request_stop(self: &Arc<Self>) -> JoinHandle<bool> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let this = Arc::clone(self);
        tokio::spawn(async move { this.apply(epoch, false).await })
    }

    async fn apply(&self, epoch: u64, start: bool) -> bool {
        let mut running = self.running.lock().await;

        let current = self.epoch.load(Ordering::SeqCst);
        if current != epoch {
            tracing::debug!(epoch, current, start, "Skipping stale prober transition");
            return false;
        }

        match (start, *running) {
            (true, false) => {
                tracing::debug!(epoch, "Initialising checker");
                let hosts = self.hosts.snapshot();
                self.prober
                    .init(self.settings, HostSet::clone(&hosts), self.callbacks.clone())
                    .await;
                self.prober.start().await;
                *running = true;
                tracing::info!(epoch, hosts = hosts.len(), "Uptime checker started");
                true
            }
            (false, true) => {
                self.prober.stop().await;
                *running = false;
                tracing::info!(epoch, "Uptime checker stopped");
                true
            }
            _ => false,
        }
    }

    /// Install a new active set, pushing it to the prober if it is running.
    ///
    /// Serialized with start/stop so a prober being started concurrently is
    /// seeded with either the old set followed by this reset, or this set.
    pub async fn replace_hosts(&self, hosts: HostSet) -> Arc<HostSet> {
        let running = self.running.lock().await;
        self.hosts.replace(hosts);
        let current = self.hosts.snapshot();
        if *running {
            tracing::debug!(hosts = current.len(), "Reset initiated");
            self.prober.reset_host_set(HostSet::clone(&current)).await;
        }
        current
    }
}
