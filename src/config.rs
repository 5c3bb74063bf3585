//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! [session]
//! max_chat_entries = 100
//! forced_specialists = ["priest"]
//! name_max_width = 16
//! seed = 42
//!
//! [logging]
//! level = "debug"
//! json = true
//! ```
//!
//! Every key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::state::types::SpecialistName;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

/// Per-session rules that are not part of the game itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Oldest chat entries are dropped beyond this count.
    pub max_chat_entries: usize,
    /// Specialists that are always among those dealt in setup.
    pub forced_specialists: Vec<SpecialistName>,
    /// Widest player name accepted, in display columns.
    pub name_max_width: usize,
    /// Fixed RNG seed; sessions draw from the OS when unset.
    pub seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_chat_entries: 100,
            forced_specialists: Vec::new(),
            name_max_width: 16,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.max_chat_entries == 0 {
            return Err(ConfigError::Invalid(
                "session.max_chat_entries must be at least 1".to_string(),
            ));
        }
        if self.session.name_max_width == 0 {
            return Err(ConfigError::Invalid(
                "session.name_max_width must be at least 1".to_string(),
            ));
        }
        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level '{}' must be one of {VALID_LEVELS:?}",
                self.logging.level
            )));
        }
        Ok(())
    }
}
