//! Interface to the network prober that performs the actual checks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::host::{HealthReport, HostSet};

/// Report handler registered with a prober.
///
/// Called from the prober's own tasks, any number of times, for any host in
/// the current set. Implementations must not block.
pub type ProbeCallback = Arc<dyn Fn(HealthReport) + Send + Sync>;

/// The three hooks a prober reports through.
#[derive(Clone)]
pub struct ProbeCallbacks {
    /// A host crossed the failure threshold.
    pub on_down: ProbeCallback,
    /// A previously failing host recovered.
    pub on_up: ProbeCallback,
    /// Every completed check.
    pub on_report: ProbeCallback,
}

impl std::fmt::Debug for ProbeCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeCallbacks").finish_non_exhaustive()
    }
}

/// Prober sizing and failure detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProberSettings {
    pub pool_size: usize,
    pub sample_size: usize,
    pub time_window: Duration,
}

/// Performs HTTP/TCP checks against a host set.
///
/// The prober guarantees at most one in-flight check per host, so reports for
/// the same host never overlap. `stop` must be callable while checks are in
/// progress and must not leak tasks. Host state survives a stop/start cycle.
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    /// (Re)initialise with settings, the initial host set and report hooks.
    async fn init(&self, settings: ProberSettings, hosts: HostSet, callbacks: ProbeCallbacks);

    async fn start(&self);

    async fn stop(&self);

    /// Replace the host set without restarting.
    async fn reset_host_set(&self, hosts: HostSet);
}
