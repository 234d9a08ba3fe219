//! In-process adapters for the collaborator traits.
//!
//! Suitable for single-node deployments and tests; a fleet needs a shared
//! store behind [`LeaseStore`](pulse_core::LeaseStore).

mod events;
mod store;
mod tenants;

pub use events::{BroadcastEventSink, FiredEvent};
pub use store::MemoryLeaseStore;
pub use tenants::MemoryTenantRegistry;
