use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use pulse_core::{LeaseStore, PulseError, Result};
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Key-value store with per-key expiry and append-only collections.
///
/// Expiry follows tokio's clock, so paused-time tests control it.
#[derive(Debug, Default)]
pub struct MemoryLeaseStore {
    keys: Mutex<HashMap<String, Entry>>,
    collections: Mutex<HashMap<String, Vec<Vec<u8>>>>,
}

impl MemoryLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries appended to a collection so far, oldest first.
    pub async fn collection(&self, name: &str) -> Vec<Vec<u8>> {
        self.collections
            .lock()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove and return every entry of a collection.
    pub async fn drain_collection(&self, name: &str) -> Vec<Vec<u8>> {
        self.collections
            .lock()
            .await
            .remove(name)
            .unwrap_or_default()
    }

    /// Time left before a key expires, `None` if absent.
    pub async fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.keys
            .lock()
            .await
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at - now)
    }
}

#[async_trait]
impl LeaseStore for MemoryLeaseStore {
    async fn get(&self, key: &str) -> Result<String> {
        let now = Instant::now();
        let mut keys = self.keys.lock().await;
        match keys.get(key) {
            Some(entry) if entry.is_live(now) => Ok(entry.value.clone()),
            Some(_) => {
                keys.remove(key);
                Err(PulseError::NotFound(key.to_string()))
            }
            None => Err(PulseError::NotFound(key.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.keys.lock().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut keys = self.keys.lock().await;
        if keys.get(key).is_some_and(|e| e.is_live(now)) {
            return Ok(false);
        }
        keys.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.keys.lock().await.remove(key);
        Ok(())
    }

    async fn append_to_collection(&self, name: &str, entry: Vec<u8>) -> Result<()> {
        self.collections
            .lock()
            .await
            .entry(name.to_string())
            .or_default()
            .push(entry);
        Ok(())
    }
}
