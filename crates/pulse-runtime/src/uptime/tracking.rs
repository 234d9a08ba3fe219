use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use base64::Engine;
use pulse_core::host::{host_authority, META_HOST, META_TARGET_URL, META_TENANT_ID};
use pulse_core::{HostCheck, HostDescriptor, HostSet, PulseError, Result};
use url::Url;

use crate::cluster::ProberLifecycle;

/// The set of hosts currently under surveillance.
///
/// Replaced wholesale, never mutated in place: readers always see either the
/// previous set or the new one.
#[derive(Debug, Default)]
pub struct ActiveHostSet {
    inner: ArcSwap<HostSet>,
}

impl ActiveHostSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current set.
    pub fn snapshot(&self) -> Arc<HostSet> {
        self.inner.load_full()
    }

    /// Install a new set, returning the one it replaced.
    pub fn replace(&self, hosts: HostSet) -> Arc<HostSet> {
        self.inner.swap(Arc::new(hosts))
    }

    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }
}

/// Outcome of preparing a batch of check configurations.
#[derive(Debug, Default)]
pub struct TrackingBatch {
    pub descriptors: Vec<HostDescriptor>,
    /// Check URL and reason for every rejected configuration.
    pub errors: Vec<(String, PulseError)>,
}

impl TrackingBatch {
    pub fn extend(&mut self, other: TrackingBatch) {
        self.descriptors.extend(other.descriptors);
        self.errors.extend(other.errors);
    }
}

/// Key descriptors by check URL. Later duplicates win.
pub fn build_host_set(descriptors: impl IntoIterator<Item = HostDescriptor>) -> HostSet {
    descriptors
        .into_iter()
        .map(|d| (d.check_url.clone(), d))
        .collect()
}

/// Turns check configurations into host descriptors and installs them as the
/// active set.
#[derive(Clone)]
pub struct TrackingSetBuilder {
    lifecycle: Arc<ProberLifecycle>,
}

impl TrackingSetBuilder {
    pub fn new(lifecycle: Arc<ProberLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// Validate one check and build its descriptor.
    pub fn prepare_descriptor(check: &HostCheck, tenant_id: &str) -> Result<HostDescriptor> {
        let url = Url::parse(&check.check_url).map_err(|e| {
            tracing::error!(url = %check.check_url, error = %e, "Invalid uptime check URL");
            PulseError::from(e)
        })?;

        let body = if check.body.is_empty() {
            None
        } else {
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(&check.body)
                .map_err(|e| {
                    tracing::error!(url = %check.check_url, error = %e, "Failed to load body data");
                    PulseError::from(e)
                })?;
            Some(decoded)
        };

        let metadata = HashMap::from([
            (META_TARGET_URL.to_string(), check.check_url.clone()),
            (META_TENANT_ID.to_string(), tenant_id.to_string()),
            (META_HOST.to_string(), host_authority(&url)),
        ]);

        Ok(HostDescriptor {
            check_url: check.check_url.clone(),
            method: check.method.clone(),
            headers: check.headers.clone(),
            body,
            metadata,
        })
    }

    /// Prepare every check, collecting failures instead of aborting.
    pub fn prepare_batch(checks: &[HostCheck], tenant_id: &str) -> TrackingBatch {
        let mut batch = TrackingBatch::default();
        for check in checks {
            match Self::prepare_descriptor(check, tenant_id) {
                Ok(descriptor) => {
                    tracing::info!(url = %check.check_url, "Adding uptime test");
                    batch.descriptors.push(descriptor);
                }
                Err(e) => {
                    tracing::warn!(url = %check.check_url, error = %e, "Adding uptime test failed");
                    batch.errors.push((check.check_url.clone(), e));
                }
            }
        }
        batch
    }

    /// Replace the active set and hand it to a running prober.
    pub async fn rebuild_active_set(&self, descriptors: Vec<HostDescriptor>) -> Arc<HostSet> {
        tracing::debug!(count = descriptors.len(), "Setting tracking list up");
        self.lifecycle.replace_hosts(build_host_set(descriptors)).await
    }

    pub fn active_set(&self) -> Arc<HostSet> {
        self.lifecycle.hosts().snapshot()
    }
}
