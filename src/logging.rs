//! `tracing` subscriber setup for binaries and demos driving pipelines.
//!
//! The library itself only emits events: stream start and finish, batch
//! materialization and split/divert wiring at `debug`, barrier window
//! decisions at `trace`, late stage additions at `warn`. Errors are returned,
//! never logged.

use crate::config::LoggingConfig;
use crate::error::{Result, StromError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` when set, the configured directive otherwise.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|e| {
            StromError::Config(format!("Invalid log filter '{}': {}", config.filter, e))
        }),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(config)?)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| StromError::Config(format!("Failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_configured_filter_is_used() {
        std::env::remove_var("RUST_LOG");
        let filter = env_filter(&LoggingConfig {
            filter: "warn,strom=trace".to_string(),
        })
        .unwrap();
        assert!(filter.to_string().contains("strom=trace"));
    }

    #[test]
    #[serial]
    fn test_invalid_filter_is_config_error() {
        std::env::remove_var("RUST_LOG");
        let err = env_filter(&LoggingConfig {
            filter: "strom=loud".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, StromError::Config(_)));
    }
}
