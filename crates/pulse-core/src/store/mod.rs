//! Shared key-value store with per-key expiry.

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Store backing the poller lease, host down markers and analytics.
///
/// Implementations must expire keys on their TTL and accept concurrent
/// appends to the same collection.
#[async_trait]
pub trait LeaseStore: Send + Sync + 'static {
    /// Read a key, failing with `NotFound` when absent or expired.
    async fn get(&self, key: &str) -> Result<String>;

    /// Write a key with a time-to-live, replacing any current value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Write a key only if it is absent. Returns whether the write happened.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Append an entry to a named append-only collection.
    async fn append_to_collection(&self, name: &str, entry: Vec<u8>) -> Result<()>;
}
