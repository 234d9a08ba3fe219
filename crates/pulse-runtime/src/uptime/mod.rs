//! Uptime tracking: host down markers, the active host set and the facade
//! tying them to the poller election.

mod manager;
mod tracker;
mod tracking;

pub use manager::{HostCheckManager, HostCheckManagerBuilder};
pub use tracker::HostStateTracker;
pub use tracking::{build_host_set, ActiveHostSet, TrackingBatch, TrackingSetBuilder};
