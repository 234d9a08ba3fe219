//! Logging bootstrap.

use pulse_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Returns false if a
/// subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.is_ok()
}
