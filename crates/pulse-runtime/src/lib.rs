//! Runtime for pulse: poller leader election, host down tracking and uptime
//! analytics over a shared TTL store.

pub mod analytics;
pub mod cluster;
pub mod memory;
pub mod observability;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod uptime;

pub use analytics::{AnalyticsRecorder, PurgeLoop};
pub use cluster::{LeaderConfig, LeaderElection, ProberLifecycle};
pub use memory::{BroadcastEventSink, MemoryLeaseStore, MemoryTenantRegistry};
pub use observability::init_logging;
pub use uptime::{
    ActiveHostSet, HostCheckManager, HostCheckManagerBuilder, HostStateTracker, TrackingBatch,
    TrackingSetBuilder,
};
