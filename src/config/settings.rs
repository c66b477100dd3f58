//! Tunables for streams, barriers and logging.
//!
//! # Main Types
//!
//! - [`StreamSettings`] - Split/divert buffer bound and derived-stream waiting
//! - [`BarrierSettings`] - Barrier buffer bound
//! - [`LoggingConfig`] - Default `tracing` filter
//!
//! Buffers are unbounded unless a limit is configured. A bounded buffer that
//! fills up fails the writing stream with `BufferOverflow` instead of
//! blocking it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default interval at which a derived stream rechecks its origin
pub const DEFAULT_SPLIT_POLL_INTERVAL_MS: u64 = 10;

/// Default `tracing` filter directive
pub const DEFAULT_LOG_FILTER: &str = "info,strom=debug";

/// Settings shared by a stream and every stream derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Maximum frames waiting in a split or divert buffer (`None` = unbounded)
    pub split_buffer_limit: Option<usize>,

    /// Block a derived stream's pull until a frame arrives or the origin
    /// closes. Only useful when origin and derived stream run on different
    /// threads; on one thread a waiting pull never returns.
    pub split_wait: bool,

    /// How often a waiting derived stream checks whether its origin closed
    pub split_poll_interval_ms: u64,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            split_buffer_limit: None,
            split_wait: false,
            split_poll_interval_ms: DEFAULT_SPLIT_POLL_INTERVAL_MS,
        }
    }
}

impl StreamSettings {
    /// Poll interval, never shorter than one millisecond.
    pub fn split_poll_interval(&self) -> Duration {
        Duration::from_millis(self.split_poll_interval_ms.max(1))
    }

    /// How long a derived pull waits between origin checks, or `None` when
    /// an empty buffer yields no frame immediately.
    pub fn split_wait_interval(&self) -> Option<Duration> {
        self.split_wait.then(|| self.split_poll_interval())
    }

    /// Make derived streams wait for frames (see [`Self::split_wait`]).
    pub fn with_split_wait(mut self) -> Self {
        self.split_wait = true;
        self
    }

    pub fn with_split_buffer_limit(mut self, limit: usize) -> Self {
        self.split_buffer_limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrierSettings {
    /// Maximum combined frames held back by the window (`None` = unbounded)
    pub buffer_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_settings_default() {
        let settings = StreamSettings::default();
        assert_eq!(settings.split_buffer_limit, None);
        assert_eq!(settings.split_poll_interval(), Duration::from_millis(10));
        assert_eq!(settings.split_wait_interval(), None);
    }

    #[test]
    fn test_split_wait_uses_poll_interval() {
        let settings = StreamSettings {
            split_poll_interval_ms: 3,
            ..Default::default()
        }
        .with_split_wait();
        assert_eq!(settings.split_wait_interval(), Some(Duration::from_millis(3)));
    }

    #[test]
    fn test_poll_interval_never_zero() {
        let settings = StreamSettings {
            split_poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(settings.split_poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: StreamSettings =
            serde_json::from_str(r#"{ "split_buffer_limit": 64 }"#).unwrap();
        assert_eq!(settings.split_buffer_limit, Some(64));
        assert_eq!(settings.split_poll_interval_ms, DEFAULT_SPLIT_POLL_INTERVAL_MS);
        assert!(!settings.split_wait);

        let logging: LoggingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(logging.filter, DEFAULT_LOG_FILTER);
    }
}
