use serde::{Deserialize, Serialize};
use crate::constants::{DEFAULT_ON_TIME_THRESHOLD_MINUTES, DEFAULT_SAFETY_MARGIN_MINUTES};
use crate::error::Result;
use crate::log;

const SAFETY_MARGIN_ENV: &str = "SAFETY_MARGIN_MINUTES";
const ON_TIME_THRESHOLD_ENV: &str = "ON_TIME_THRESHOLD_MINUTES";

/// Fixed configuration of the engine, captured by value at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Minimum gap between two trains sharing a section
    pub safety_margin_minutes: u32,
    /// Trains delayed by at most this many minutes count as punctual
    pub on_time_threshold_minutes: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            safety_margin_minutes: DEFAULT_SAFETY_MARGIN_MINUTES,
            on_time_threshold_minutes: DEFAULT_ON_TIME_THRESHOLD_MINUTES,
        }
    }
}

impl EngineSettings {
    #[must_use]
    pub fn with_safety_margin(safety_margin_minutes: u32) -> Self {
        Self {
            safety_margin_minutes,
            ..Self::default()
        }
    }

    /// Parse settings from JSON, filling missing fields with defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `SAFETY_MARGIN_MINUTES` / `ON_TIME_THRESHOLD_MINUTES` from the environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(SAFETY_MARGIN_ENV) {
            match value.trim().parse() {
                Ok(minutes) => self.safety_margin_minutes = minutes,
                Err(_) => log!("Ignoring {}={:?}: not a number of minutes", SAFETY_MARGIN_ENV, value),
            }
        }
        if let Some(value) = lookup(ON_TIME_THRESHOLD_ENV) {
            match value.trim().parse() {
                Ok(minutes) => self.on_time_threshold_minutes = minutes,
                Err(_) => log!("Ignoring {}={:?}: not a number of minutes", ON_TIME_THRESHOLD_ENV, value),
            }
        }
        self
    }
}
