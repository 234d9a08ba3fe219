use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};
use crate::probe::ProberSettings;

/// Uptime check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UptimeConfig {
    /// Run the election loop and prober at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Concurrent checks the prober may run.
    #[serde(default = "default_pool_size")]
    pub checker_pool_size: usize,

    /// Consecutive failures before a host is reported down.
    #[serde(default = "default_sample_size")]
    pub failure_trigger_sample_size: usize,

    /// Failure sample window in seconds; also the TTL of a down marker.
    #[serde(default = "default_time_wait")]
    pub time_wait_secs: u64,

    /// Record every health report as an uptime analytics entry.
    #[serde(default)]
    pub enable_uptime_analytics: bool,

    /// Prefix of the per-host down marker keys.
    #[serde(default = "default_host_key_prefix")]
    pub host_key_prefix: String,
}

impl Default for UptimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            checker_pool_size: default_pool_size(),
            failure_trigger_sample_size: default_sample_size(),
            time_wait_secs: default_time_wait(),
            enable_uptime_analytics: false,
            host_key_prefix: default_host_key_prefix(),
        }
    }
}

impl UptimeConfig {
    /// TTL applied to down markers.
    pub fn failure_window(&self) -> Duration {
        Duration::from_secs(self.time_wait_secs)
    }

    /// Settings handed to the prober on every start.
    pub fn prober_settings(&self) -> ProberSettings {
        ProberSettings {
            pool_size: self.checker_pool_size,
            sample_size: self.failure_trigger_sample_size,
            time_window: self.failure_window(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_wait_secs == 0 {
            return Err(PulseError::Config(
                "uptime.time_wait_secs must be positive".into(),
            ));
        }
        if self.checker_pool_size == 0 {
            return Err(PulseError::Config(
                "uptime.checker_pool_size must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> usize {
    50
}

fn default_sample_size() -> usize {
    3
}

fn default_time_wait() -> u64 {
    10
}

fn default_host_key_prefix() -> String {
    "PollerCheckerInstance:".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prober_settings_follow_config() {
        let config = UptimeConfig {
            checker_pool_size: 4,
            failure_trigger_sample_size: 2,
            time_wait_secs: 30,
            ..Default::default()
        };

        let settings = config.prober_settings();
        assert_eq!(settings.pool_size, 4);
        assert_eq!(settings.sample_size, 2);
        assert_eq!(settings.time_window, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = UptimeConfig {
            time_wait_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
