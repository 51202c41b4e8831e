//! Session Configuration
//!
//! Every tunable the engine reads. Defaults reproduce the stock minigame;
//! a JSON file can override any subset of fields.

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File was not valid JSON for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field held an unusable value
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Tunables for one excavation session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcavationConfig {
    /// Item anchor accepted when a 16-bit draw exceeds this (~25%).
    pub item_accept_threshold: u16,
    /// Stone anchor accepted when a 16-bit draw exceeds this.
    pub stone_accept_threshold: u16,
    /// Full scan passes before placement falls back to the first legal cell.
    pub max_placement_passes: u32,
    /// Ticks each shake step is held.
    pub shake_step_ticks: u16,
    /// Ticks between the shake settling and the tool visual disappearing.
    pub shake_settle_ticks: u16,
    /// Length of the fade in and fade out.
    pub fade_ticks: u16,
    /// Crack position at which the wall collapses.
    pub crack_limit: u8,
}

impl Default for ExcavationConfig {
    fn default() -> Self {
        Self {
            item_accept_threshold: 49151,
            stone_accept_threshold: 60000,
            max_placement_passes: 64,
            shake_step_ticks: 2,
            shake_settle_ticks: 4,
            fade_ticks: 16,
            crack_limit: 7,
        }
    }
}

impl ExcavationConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_placement_passes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_placement_passes",
                reason: "must be at least 1",
            });
        }
        if self.fade_ticks == 0 {
            return Err(ConfigError::Invalid {
                field: "fade_ticks",
                reason: "must be at least 1",
            });
        }
        if self.shake_step_ticks == 0 {
            return Err(ConfigError::Invalid {
                field: "shake_step_ticks",
                reason: "must be at least 1",
            });
        }
        // The crack strip has room for seven positions.
        if !(1..=7).contains(&self.crack_limit) {
            return Err(ConfigError::Invalid {
                field: "crack_limit",
                reason: "must be in 1..=7",
            });
        }
        Ok(())
    }
}
