//! Meter configuration: tick cadence, idle threshold and break length.
//!
//! The idle threshold and the break length are independent knobs; changing
//! one never implies the other.

use crate::error::{Error, Result};
use crate::event::Seconds;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::path::Path;

/// Environment variable overriding [`MeterConfig::tick_seconds`].
pub const ENV_TICK_SECONDS: &str = "ACTIMETER_TICK_SECONDS";
/// Environment variable overriding [`MeterConfig::idle_threshold`].
pub const ENV_IDLE_THRESHOLD: &str = "ACTIMETER_IDLE_THRESHOLD";
/// Environment variable overriding [`MeterConfig::break_length`].
pub const ENV_BREAK_LENGTH: &str = "ACTIMETER_BREAK_LENGTH";

/// Default tick cadence in seconds.
pub const DEFAULT_TICK_SECONDS: Seconds = 1;
/// Default idle threshold: no input for longer than this means "on break".
pub const DEFAULT_IDLE_THRESHOLD: Seconds = 4;
/// Default break length: an idle run this long counts as one break.
pub const DEFAULT_BREAK_LENGTH: Seconds = 5 * 60;
/// Longest accepted tick cadence.
pub const MAX_TICK_SECONDS: Seconds = 24 * 60 * 60;

/// Tunables for the statistics engine and the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeterConfig {
    /// Seconds between ticks; also the amount each tick adds to the current run.
    pub tick_seconds: Seconds,
    /// Seconds without input after which the user counts as passive.
    pub idle_threshold: Seconds,
    /// Seconds of passivity that register one break.
    pub break_length: Seconds,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            tick_seconds: DEFAULT_TICK_SECONDS,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            break_length: DEFAULT_BREAK_LENGTH,
        }
    }
}

impl MeterConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tick cadence.
    pub fn with_tick_seconds(mut self, secs: Seconds) -> Self {
        self.tick_seconds = secs;
        self
    }

    /// Set the idle threshold.
    pub fn with_idle_threshold(mut self, secs: Seconds) -> Self {
        self.idle_threshold = secs;
        self
    }

    /// Set the break length.
    pub fn with_break_length(mut self, secs: Seconds) -> Self {
        self.break_length = secs;
        self
    }

    /// Tick cadence as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_seconds)
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.tick_seconds == 0 {
            return Err(Error::InvalidConfig("tick_seconds must be at least 1".into()));
        }
        if self.tick_seconds > MAX_TICK_SECONDS {
            return Err(Error::InvalidConfig(format!(
                "tick_seconds must be at most {}, got {}",
                MAX_TICK_SECONDS, self.tick_seconds
            )));
        }
        if self.break_length == 0 {
            return Err(Error::InvalidConfig("break_length must be at least 1".into()));
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by the `ACTIMETER_*` names.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str, current: Seconds| -> Result<Seconds> {
            match lookup(key) {
                Some(raw) => raw.trim().parse().map_err(|e| {
                    Error::InvalidConfig(format!("{}={:?}: {}", key, raw, e))
                }),
                None => Ok(current),
            }
        };

        self.tick_seconds = parse(ENV_TICK_SECONDS, self.tick_seconds)?;
        self.idle_threshold = parse(ENV_IDLE_THRESHOLD, self.idle_threshold)?;
        self.break_length = parse(ENV_BREAK_LENGTH, self.break_length)?;
        self.validate()?;

        log::debug!("Loaded config: {:?}", self);
        Ok(self)
    }

    /// Parse a JSON config; missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MeterConfig = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("failed to read config file: {}", e)))?;
        Self::from_json(&json)
    }
}
