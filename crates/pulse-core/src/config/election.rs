use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};

/// Poller lease election configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionConfig {
    /// Seconds between lease acquire/renew attempts.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Lease time-to-live in seconds. Must exceed the poll interval.
    #[serde(default = "default_lease_ttl")]
    pub lease_ttl_secs: u64,

    /// Store key holding the current lease owner.
    #[serde(default = "default_lease_key")]
    pub lease_key: String,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            lease_ttl_secs: default_lease_ttl(),
            lease_key: default_lease_key(),
        }
    }
}

impl ElectionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn lease_ttl(&self) -> Duration {
        Duration::from_secs(self.lease_ttl_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(PulseError::Config(
                "election.poll_interval_secs must be positive".into(),
            ));
        }
        if self.lease_ttl_secs <= self.poll_interval_secs {
            return Err(PulseError::Config(format!(
                "election.lease_ttl_secs ({}) must be greater than poll_interval_secs ({})",
                self.lease_ttl_secs, self.poll_interval_secs
            )));
        }
        Ok(())
    }
}

fn default_poll_interval() -> u64 {
    10
}

fn default_lease_ttl() -> u64 {
    15
}

fn default_lease_key() -> String {
    "PollerActiveInstanceID".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_election_config() {
        let config = ElectionConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.lease_ttl(), Duration::from_secs(15));
        assert_eq!(config.lease_key, "PollerActiveInstanceID");
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let config = ElectionConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
