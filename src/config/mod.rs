//! Engine configuration
//!
//! The configuration file holds the default settings applied to streams and
//! barriers built by a driver, plus the logging filter.
//!
//! # Location
//!
//! [`EngineConfig::load_or_default`] reads `engine.json` from the
//! platform configuration directory:
//! - **Linux**: `~/.config/strom/`
//! - **macOS**: `~/Library/Application Support/strom/`
//! - **Windows**: `%APPDATA%\strom\`
//!
//! Files ending in `.toml` are read and written as TOML, anything else as JSON.
//!
//! # Environment
//!
//! - `STROM_LOG` replaces the configured logging filter.
//!
//! # Example
//!
//! ```no_run
//! use strom::config::EngineConfig;
//!
//! let config = EngineConfig::load("pipeline.toml")?;
//! let settings = config.stream.clone();
//! # Ok::<(), strom::StromError>(())
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, ResultExt, StromError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform configuration directory
pub const APP_DIR: &str = "strom";

/// Default configuration filename
pub const CONFIG_FILE: &str = "engine.json";

/// Environment variable overriding the logging filter
pub const LOG_ENV: &str = "STROM_LOG";

/// Get the path of the default configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_DIR).join(CONFIG_FILE))
}

/// Engine-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// File format version
    #[serde(default = "default_config_version")]
    pub version: u32,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Defaults for new streams
    #[serde(default)]
    pub stream: StreamSettings,

    /// Defaults for new barriers
    #[serde(default)]
    pub barrier: BarrierSettings,
}

fn default_config_version() -> u32 {
    1
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            logging: LoggingConfig::default(),
            stream: StreamSettings::default(),
            barrier: BarrierSettings::default(),
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

impl EngineConfig {
    /// Load a configuration file, applying environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(StromError::from)
            .with_context(|| format!("Failed to read config {:?}", path))?;

        let mut config: Self = if is_toml(path) {
            toml::from_str::<Self>(&content).map_err(StromError::from)
        } else {
            serde_json::from_str::<Self>(&content).map_err(StromError::from)
        }
        .with_context(|| format!("Failed to parse config {:?}", path))?;

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load the default configuration file, falling back to defaults if it
    /// is missing or unreadable
    pub fn load_or_default() -> Self {
        if let Some(path) = default_config_path().filter(|p| p.exists()) {
            match Self::load(&path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Failed to load engine config, using defaults: {}", e),
            }
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Save the configuration, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(StromError::from)
                .context("Failed to create config directory")?;
        }

        let content = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| StromError::Serialization(e.to_string()))?
        } else {
            serde_json::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .map_err(StromError::from)
            .with_context(|| format!("Failed to write config {:?}", path))
    }

    /// Apply `STROM_LOG` on top of the loaded values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(filter) = std::env::var(LOG_ENV) {
            if !filter.trim().is_empty() {
                self.logging.filter = filter;
            }
        }
    }
}
