use std::sync::Arc;
use std::time::Duration;

use pulse_core::host::{best_effort_authority, host_authority};
use pulse_core::{EventKind, EventSink, HealthReport, HostStatusEvent, LeaseStore, TenantRegistry};
use tokio::task::JoinHandle;
use url::Url;

/// Tracks which hosts are down through TTL-bearing markers in the store.
///
/// A marker's presence means down; absence means up. Markers expire after the
/// failure window, so a host marked down by an instance that then dies is
/// considered up again one window later.
pub struct HostStateTracker {
    store: Arc<dyn LeaseStore>,
    tenants: Arc<dyn TenantRegistry>,
    events: Arc<dyn EventSink>,
    failure_window: Duration,
    key_prefix: String,
}

impl HostStateTracker {
    pub fn new(
        store: Arc<dyn LeaseStore>,
        tenants: Arc<dyn TenantRegistry>,
        events: Arc<dyn EventSink>,
        failure_window: Duration,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            tenants,
            events,
            failure_window,
            key_prefix: key_prefix.into(),
        }
    }

    pub fn failure_window(&self) -> Duration {
        self.failure_window
    }

    /// Store key of the down marker for a host authority.
    pub fn host_key(&self, authority: &str) -> String {
        format!("{}{}", self.key_prefix, authority)
    }

    /// Record a host as down and fire a host-down event.
    ///
    /// Returns the event delivery task, `None` when no event was fired.
    pub async fn mark_down(&self, report: HealthReport) -> Option<JoinHandle<()>> {
        let key = self.host_key(report.host_authority());
        tracing::debug!(key = %key, "Update key");
        if let Err(e) = self.store.set(&key, "1", self.failure_window).await {
            tracing::error!(key = %key, error = %e, "Failed to set host down marker");
        }

        tracing::warn!(url = %report.check_url, "Host is DOWN");
        self.fire(EventKind::HostDown, report)
    }

    /// Clear a host's down marker and fire a host-up event.
    pub async fn mark_up(&self, report: HealthReport) -> Option<JoinHandle<()>> {
        let key = self.host_key(report.host_authority());
        tracing::debug!(key = %key, "Delete key");
        if let Err(e) = self.store.delete(&key).await {
            tracing::error!(key = %key, error = %e, "Failed to clear host down marker");
        }

        tracing::warn!(url = %report.check_url, "Host is UP");
        self.fire(EventKind::HostUp, report)
    }

    /// Whether the host of `target_url` currently carries a down marker.
    ///
    /// An unparsable URL is logged and looked up by a best-effort authority,
    /// which normally finds no marker and reports the host up.
    pub async fn is_down(&self, target_url: &str) -> bool {
        let authority = match Url::parse(target_url) {
            Ok(url) => host_authority(&url),
            Err(e) => {
                tracing::error!(url = %target_url, error = %e, "Failed to parse target URL");
                best_effort_authority(target_url)
            }
        };

        let key = self.host_key(&authority);
        tracing::debug!(key = %key, "Checking host marker");
        match self.store.get(&key).await {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to read host down marker");
                false
            }
        }
    }

    fn fire(&self, kind: EventKind, report: HealthReport) -> Option<JoinHandle<()>> {
        let tenant_id = report.tenant_id().to_string();
        if let Err(e) = self.tenants.lookup(&tenant_id) {
            tracing::warn!(tenant_id = %tenant_id, error = %e, "Event can't fire for API that doesn't exist");
            return None;
        }

        let payload = match kind {
            EventKind::HostDown => HostStatusEvent::down(report),
            EventKind::HostUp => HostStatusEvent::up(report),
        };
        let events = self.events.clone();
        Some(tokio::spawn(async move {
            events.fire(&tenant_id, kind, payload).await;
        }))
    }
}
