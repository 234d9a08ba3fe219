use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulse_core::config::ElectionConfig;
use pulse_core::{InstanceId, LeaseStore};
use tokio::sync::watch;

use super::lifecycle::ProberLifecycle;

/// Leader election configuration.
#[derive(Debug, Clone)]
pub struct LeaderConfig {
    /// How often the lease is acquired or renewed.
    pub check_interval: Duration,
    /// Lease duration (leader must renew before expiry).
    pub lease_duration: Duration,
    /// Store key holding the lease owner.
    pub lease_key: String,
}

impl Default for LeaderConfig {
    fn default() -> Self {
        Self::from(&ElectionConfig::default())
    }
}

impl From<&ElectionConfig> for LeaderConfig {
    fn from(config: &ElectionConfig) -> Self {
        Self {
            check_interval: config.poll_interval(),
            lease_duration: config.lease_ttl(),
            lease_key: config.lease_key.clone(),
        }
    }
}

/// Poller election over a TTL lease in the shared store.
///
/// There is no fencing token. If the leader's lease lapses and another
/// instance claims it, the old leader keeps probing until its next tick
/// reads the new owner, so two probers may overlap for up to one lease TTL
/// plus one check interval. Consumers of the reports must tolerate that.
pub struct LeaderElection {
    store: Arc<dyn LeaseStore>,
    instance_id: InstanceId,
    config: LeaderConfig,
    is_leader: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl LeaderElection {
    /// Create a new leader election instance.
    pub fn new(store: Arc<dyn LeaseStore>, instance_id: InstanceId, config: LeaderConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            store,
            instance_id,
            config,
            is_leader: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    /// Leadership as of the last election tick.
    pub fn is_leader(&self) -> bool {
        self.is_leader.load(Ordering::SeqCst)
    }

    /// Shared handle on the last-known leadership flag.
    pub fn leader_flag(&self) -> Arc<AtomicBool> {
        self.is_leader.clone()
    }

    /// Get a shutdown receiver.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Whether [`LeaderElection::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Stop the election loop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Claim an empty lease or renew our own.
    ///
    /// Returns `false` when another instance holds the lease.
    pub async fn try_acquire_or_renew(&self) -> pulse_core::Result<bool> {
        let key = &self.config.lease_key;
        let me = self.instance_id.to_string();

        match self.store.get(key).await {
            Err(e) if e.is_not_found() => {
                let claimed = self
                    .store
                    .set_if_absent(key, &me, self.config.lease_duration)
                    .await?;
                if claimed {
                    tracing::debug!(instance_id = %me, "No primary instance found, assuming control");
                }
                Ok(claimed)
            }
            Err(e) => Err(e),
            Ok(owner) if self.instance_id.owns(&owner) => {
                self.store
                    .set(key, &me, self.config.lease_duration)
                    .await?;
                tracing::debug!(instance_id = %me, "Primary instance set, lease renewed");
                Ok(true)
            }
            Ok(owner) => {
                tracing::debug!(active = %owner, instance_id = %me, "Another instance holds the poller lease");
                Ok(false)
            }
        }
    }

    /// Run one election tick, updating the leadership flag.
    ///
    /// Store failures count as "not leader".
    pub async fn poll(&self) -> bool {
        let leader = match self.try_acquire_or_renew().await {
            Ok(leader) => leader,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to acquire or renew poller lease");
                false
            }
        };
        self.is_leader.store(leader, Ordering::SeqCst);
        leader
    }

    /// Run the election loop, starting and stopping the prober on
    /// leadership transitions.
    pub async fn run(&self, lifecycle: Arc<ProberLifecycle>) {
        let mut shutdown_rx = self.shutdown_rx.clone();
        let mut prober_wanted = false;

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            if self.poll().await {
                if !prober_wanted {
                    tracing::info!(instance_id = %self.instance_id, "Became poller leader, starting uptime tests");
                    prober_wanted = true;
                    lifecycle.request_start();
                }
            } else if prober_wanted {
                tracing::info!(instance_id = %self.instance_id, "New poller leader found, stopping uptime tests");
                prober_wanted = false;
                lifecycle.request_stop();
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.check_interval) => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Stopping uptime tests");
        if prober_wanted {
            if let Err(e) = lifecycle.request_stop().await {
                tracing::warn!(error = %e, "Prober stop task failed");
            }
        }
        self.is_leader.store(false, Ordering::SeqCst);
    }
}
