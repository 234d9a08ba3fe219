mod analytics;
mod election;
mod observability;
mod uptime;

pub use analytics::{AnalyticsConfig, PURGE_DISABLED};
pub use election::ElectionConfig;
pub use observability::LoggingConfig;
pub use uptime::UptimeConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PulseError, Result};

/// Root configuration for a pulse instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Poller lease election.
    #[serde(default)]
    pub election: ElectionConfig,

    /// Uptime checking.
    #[serde(default)]
    pub uptime: UptimeConfig,

    /// Uptime analytics storage.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PulseConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PulseError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content);

        let config: Self = toml::from_str(&content)
            .map_err(|e| PulseError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints of every section.
    pub fn validate(&self) -> Result<()> {
        self.election.validate()?;
        self.uptime.validate()?;
        self.analytics.validate()?;
        Ok(())
    }
}

/// Replace `${VAR}` references with values from the environment.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
        Ok(re) => re,
        Err(_) => return result,
    };

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PulseConfig::default();
        assert_eq!(config.election.poll_interval_secs, 10);
        assert_eq!(config.election.lease_ttl_secs, 15);
        assert!(!config.uptime.enable_uptime_analytics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = PulseConfig::parse_toml("").unwrap();
        assert_eq!(config.uptime.checker_pool_size, 50);
        assert_eq!(config.analytics.purge_delay_secs, 10);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [election]
            poll_interval_secs = 5
            lease_ttl_secs = 8

            [uptime]
            checker_pool_size = 10
            failure_trigger_sample_size = 2
            time_wait_secs = 30
            enable_uptime_analytics = true

            [analytics]
            purge_delay_secs = -1
            collection = "uptime"

            [logging]
            level = "debug"
            json_format = true
        "#;

        let config = PulseConfig::parse_toml(toml).unwrap();
        assert_eq!(config.election.poll_interval_secs, 5);
        assert_eq!(config.uptime.time_wait_secs, 30);
        assert!(config.uptime.enable_uptime_analytics);
        assert!(config.analytics.purge_disabled());
        assert_eq!(config.analytics.collection, "uptime");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_rejects_lease_shorter_than_poll() {
        let toml = r#"
            [election]
            poll_interval_secs = 10
            lease_ttl_secs = 10
        "#;

        assert!(matches!(
            PulseConfig::parse_toml(toml),
            Err(PulseError::Config(_))
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PULSE_TEST_COLLECTION", "from-env");

        let toml = r#"
            [analytics]
            collection = "${PULSE_TEST_COLLECTION}"
        "#;

        let config = PulseConfig::parse_toml(toml).unwrap();
        assert_eq!(config.analytics.collection, "from-env");
    }
}
