//! Section lookup and cross-checks between trains and the sections they use.

use indexmap::IndexMap;
use std::collections::HashSet;
use super::{TrackSection, Train};
use crate::error::{Error, Result};

/// Sections keyed by id, in the order they were provided
pub type SectionIndex<'a> = IndexMap<&'a str, &'a TrackSection>;

/// Index sections by id, rejecting duplicates
///
/// # Errors
///
/// Returns `Error::DuplicateSection` if two sections share an id
pub fn index_sections(sections: &[TrackSection]) -> Result<SectionIndex<'_>> {
    let mut index = IndexMap::with_capacity(sections.len());
    for section in sections {
        if index.insert(section.section_id.as_str(), section).is_some() {
            return Err(Error::DuplicateSection(section.section_id.clone()));
        }
    }
    Ok(index)
}

/// Check that every route entry of every train resolves against the index
///
/// # Errors
///
/// Returns `Error::UnknownSection` for the first unresolved route entry
pub fn check_routes(trains: &[Train], index: &SectionIndex<'_>) -> Result<()> {
    for train in trains {
        if let Some(missing) = train.route.iter().find(|id| !index.contains_key(id.as_str())) {
            return Err(Error::UnknownSection {
                train_id: train.train_id.clone(),
                section_id: missing.clone(),
            });
        }
    }
    Ok(())
}

/// Index the sections and resolve every route against them
///
/// # Errors
///
/// Returns `Error::DuplicateSection` or `Error::UnknownSection`
pub fn resolve_network<'a>(trains: &[Train], sections: &'a [TrackSection]) -> Result<SectionIndex<'a>> {
    let index = index_sections(sections)?;
    check_routes(trains, &index)?;
    Ok(index)
}

/// Full validation of a train set and its sections
///
/// # Errors
///
/// Returns the first validation failure: malformed section or train,
/// duplicate ids, or a route naming an unknown section
pub fn validate_network(trains: &[Train], sections: &[TrackSection]) -> Result<()> {
    for section in sections {
        section.validate()?;
    }
    let mut seen = HashSet::new();
    for train in trains {
        train.validate()?;
        if !seen.insert(train.train_id.as_str()) {
            return Err(Error::DuplicateTrain(train.train_id.clone()));
        }
    }
    resolve_network(trains, sections).map(|_| ())
}
