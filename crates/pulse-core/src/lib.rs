pub mod analytics;
pub mod cluster;
pub mod config;
pub mod error;
pub mod event;
pub mod host;
pub mod probe;
pub mod store;
pub mod tenant;

pub use analytics::{Purger, ServerErrorPredicate, UptimeRecord};
pub use cluster::InstanceId;
pub use config::PulseConfig;
pub use error::{PulseError, Result};
pub use event::{EventKind, EventSink, HostStatusEvent};
pub use host::{HealthReport, HostCheck, HostDescriptor, HostSet};
pub use probe::{ProbeCallback, ProbeCallbacks, Prober, ProberSettings};
pub use store::LeaseStore;
pub use tenant::{TenantRegistry, TenantSpec, UptimeTests};
