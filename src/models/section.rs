use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionType {
    SingleLine,
    DoubleLine,
    Junction,
    Platform,
}

impl SectionType {
    /// Junctions and single-line sections are bottlenecks: conflicts there weigh more
    #[must_use]
    pub fn is_critical(self) -> bool {
        matches!(self, Self::Junction | Self::SingleLine)
    }
}

/// A section of railway track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSection {
    pub section_id: String,
    pub name: String,
    pub section_type: SectionType,
    pub length_km: f64,
    pub max_speed_kmh: u32,
    /// Number of trains that can occupy the section simultaneously
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default = "default_signal_blocks")]
    pub signal_blocks: u32,
}

fn default_capacity() -> u32 {
    1
}

fn default_signal_blocks() -> u32 {
    1
}

impl TrackSection {
    #[must_use]
    pub fn new(
        section_id: impl Into<String>,
        name: impl Into<String>,
        section_type: SectionType,
        length_km: f64,
        max_speed_kmh: u32,
        capacity: u32,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            name: name.into(),
            section_type,
            length_km,
            max_speed_kmh,
            capacity,
            signal_blocks: default_signal_blocks(),
        }
    }

    /// Check the section can be handed to the engine
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSection` for an empty id, zero capacity or a negative length
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidSection {
            section_id: self.section_id.clone(),
            reason: reason.to_string(),
        };

        if self.section_id.trim().is_empty() {
            return Err(invalid("section id is empty"));
        }
        if self.capacity == 0 {
            return Err(invalid("capacity must be at least 1"));
        }
        if !self.length_km.is_finite() || self.length_km < 0.0 {
            return Err(invalid("length must be a non-negative number of kilometres"));
        }
        Ok(())
    }
}

impl std::fmt::Display for TrackSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.section_id)
    }
}
