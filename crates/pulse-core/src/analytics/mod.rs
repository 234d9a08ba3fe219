//! Uptime analytics records.

mod record;

pub use record::{ServerErrorPredicate, UptimeRecord, NEVER_EXPIRE};

use async_trait::async_trait;

/// Drains or rolls the analytics collection into long-term storage.
#[async_trait]
pub trait Purger: Send + Sync + 'static {
    /// Errors are handled and logged by the purger itself.
    async fn purge(&self);
}
