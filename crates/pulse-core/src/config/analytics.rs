use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};

/// `purge_delay_secs` value that turns the purge loop off.
pub const PURGE_DISABLED: i64 = -1;

/// Uptime analytics storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Seconds between purges, or `-1` to leave retention to the operator.
    #[serde(default = "default_purge_delay")]
    pub purge_delay_secs: i64,

    /// Name of the append-only collection records are written to.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            purge_delay_secs: default_purge_delay(),
            collection: default_collection(),
        }
    }
}

impl AnalyticsConfig {
    pub fn purge_disabled(&self) -> bool {
        self.purge_delay_secs == PURGE_DISABLED
    }

    /// Purge interval, `None` when purging is disabled.
    pub fn purge_interval(&self) -> Option<Duration> {
        if self.purge_disabled() {
            None
        } else {
            Some(Duration::from_secs(self.purge_delay_secs as u64))
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.purge_delay_secs < PURGE_DISABLED || self.purge_delay_secs == 0 {
            return Err(PulseError::Config(format!(
                "analytics.purge_delay_secs must be positive or {}, got {}",
                PURGE_DISABLED, self.purge_delay_secs
            )));
        }
        Ok(())
    }
}

fn default_purge_delay() -> i64 {
    10
}

fn default_collection() -> String {
    "pulse-uptime-analytics".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purge_interval() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.purge_interval(), Some(Duration::from_secs(10)));

        let disabled = AnalyticsConfig {
            purge_delay_secs: PURGE_DISABLED,
            ..Default::default()
        };
        assert!(disabled.purge_disabled());
        assert_eq!(disabled.purge_interval(), None);
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn test_invalid_purge_delay() {
        for delay in [0, -2, -100] {
            let config = AnalyticsConfig {
                purge_delay_secs: delay,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "delay {} accepted", delay);
        }
    }
}
