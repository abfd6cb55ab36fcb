use serde::{Deserialize, Serialize};
use super::network::{check_routes, index_sections, validate_network};
use super::{TrackSection, Train};
use crate::error::{Error, Result};

/// A controlled railway section: its track sections and the trains currently
/// planned through it. This is the mutable session state an orchestration
/// layer holds; the engine itself only ever receives slices of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionController {
    pub controller_id: String,
    pub name: String,
    sections: Vec<TrackSection>,
    active_trains: Vec<Train>,
}

impl SectionController {
    /// Build a controller, validating the sections and trains against each other
    ///
    /// # Errors
    ///
    /// Returns the first validation error found in the sections or trains
    pub fn new(
        controller_id: impl Into<String>,
        name: impl Into<String>,
        sections: Vec<TrackSection>,
        active_trains: Vec<Train>,
    ) -> Result<Self> {
        validate_network(&active_trains, &sections)?;
        Ok(Self {
            controller_id: controller_id.into(),
            name: name.into(),
            sections,
            active_trains,
        })
    }

    #[must_use]
    pub fn sections(&self) -> &[TrackSection] {
        &self.sections
    }

    #[must_use]
    pub fn active_trains(&self) -> &[Train] {
        &self.active_trains
    }

    #[must_use]
    pub fn section(&self, section_id: &str) -> Option<&TrackSection> {
        self.sections.iter().find(|s| s.section_id == section_id)
    }

    #[must_use]
    pub fn train(&self, train_id: &str) -> Option<&Train> {
        self.active_trains.iter().find(|t| t.train_id == train_id)
    }

    /// Next free id in the `T001`, `T002`, ... sequence
    #[must_use]
    pub fn next_train_id(&self) -> String {
        (self.active_trains.len() + 1..)
            .map(|n| format!("T{n:03}"))
            .find(|id| self.train(id).is_none())
            .unwrap_or_default()
    }

    /// Add a train after checking it against the controller's sections
    ///
    /// # Errors
    ///
    /// Returns an error if the train is malformed, its id is taken, or its
    /// route leaves the controlled sections
    pub fn add_train(&mut self, train: Train) -> Result<()> {
        train.validate()?;
        if self.train(&train.train_id).is_some() {
            return Err(Error::DuplicateTrain(train.train_id));
        }
        let index = index_sections(&self.sections)?;
        check_routes(std::slice::from_ref(&train), &index)?;
        self.active_trains.push(train);
        Ok(())
    }

    /// Remove a train, returning it if it was present
    pub fn remove_train(&mut self, train_id: &str) -> Option<Train> {
        let position = self.active_trains.iter().position(|t| t.train_id == train_id)?;
        Some(self.active_trains.remove(position))
    }

    /// Adopt a new train set, e.g. the output of an optimization run
    ///
    /// # Errors
    ///
    /// Returns an error if the new set doesn't validate against the sections;
    /// the current trains are kept in that case
    pub fn replace_trains(&mut self, trains: Vec<Train>) -> Result<()> {
        validate_network(&trains, &self.sections)?;
        self.active_trains = trains;
        Ok(())
    }

    /// Replace the whole state with another controller's, e.g. fresh sample data
    pub fn reset(&mut self, other: Self) {
        *self = other;
    }
}

impl std::fmt::Display for SectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Section Controller: {} ({} sections, {} active trains)",
            self.name,
            self.sections.len(),
            self.active_trains.len()
        )
    }
}
