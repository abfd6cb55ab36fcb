//! Error types for the section control engine.

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by validation, the engine entry points and the data loaders
#[derive(Error, Debug)]
pub enum Error {
    /// A train's route names a section that isn't part of the provided set
    #[error("Train {train_id} references unknown section {section_id}")]
    UnknownSection { train_id: String, section_id: String },

    /// A what-if scenario targets a train that isn't in the train set
    #[error("Unknown train: {0}")]
    UnknownTrain(String),

    #[error("Invalid section {section_id}: {reason}")]
    InvalidSection { section_id: String, reason: String },

    #[error("Invalid train {train_id}: {reason}")]
    InvalidTrain { train_id: String, reason: String },

    #[error("Duplicate train id: {0}")]
    DuplicateTrain(String),

    #[error("Duplicate section id: {0}")]
    DuplicateSection(String),

    /// Settings JSON could not be parsed
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV record parsed but carried an unusable value
    #[error("Invalid record on line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
}

impl Error {
    /// Whether the error comes from bad caller input rather than a missing entity
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownSection { .. }
                | Self::InvalidSection { .. }
                | Self::InvalidTrain { .. }
                | Self::DuplicateTrain(_)
                | Self::DuplicateSection(_)
        )
    }
}
