mod resolution;
mod severity;
mod types;

pub use resolution::{ConflictResolver, ResolutionStrategy};
pub use severity::calculate_severity;
pub use types::{Conflict, ConflictParty, ConflictSummary};

use crate::error::Result;
use crate::log;
use crate::models::{resolve_network, TrackSection, Train};
use crate::settings::EngineSettings;
use crate::time::minutes;
use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::HashSet;

/// One train's stay in one section
#[derive(Debug, Clone, Copy)]
pub(crate) struct Occupancy<'a> {
    pub train: &'a Train,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Occupancy<'_> {
    /// Overlap test with the margin added to whichever interval ends first
    fn overlaps_with_margin(&self, other: &Self, margin: Duration) -> bool {
        self.start.max(other.start) < self.end.min(other.end) + margin
    }
}

/// Per-section occupancy timelines, keyed by section id
pub(crate) type SectionTimelines<'a> = IndexMap<&'a str, Vec<Occupancy<'a>>>;

/// Replay every train's route from its effective arrival and collect who
/// occupies which section when. Each timeline is sorted by start time, then
/// train id, so the result doesn't depend on the order of `trains`.
pub(crate) fn build_section_timelines<'a>(
    trains: &'a [Train],
    section_order: impl IntoIterator<Item = &'a str>,
) -> SectionTimelines<'a> {
    let mut timelines: SectionTimelines<'a> = section_order
        .into_iter()
        .map(|section_id| (section_id, Vec::new()))
        .collect();

    for train in trains {
        for (section_id, start, end) in train.section_occupancies() {
            timelines
                .entry(section_id)
                .or_default()
                .push(Occupancy { train, start, end });
        }
    }

    for occupancies in timelines.values_mut() {
        occupancies.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.train.train_id.cmp(&b.train.train_id))
        });
    }

    timelines
}

/// Finds trains whose section occupancies collide
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector {
    safety_margin_minutes: u32,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::from_settings(&EngineSettings::default())
    }
}

impl ConflictDetector {
    #[must_use]
    pub fn new(safety_margin_minutes: u32) -> Self {
        Self { safety_margin_minutes }
    }

    #[must_use]
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.safety_margin_minutes)
    }

    #[must_use]
    pub fn safety_margin_minutes(&self) -> u32 {
        self.safety_margin_minutes
    }

    /// Detect all conflicts between `trains` on `sections`.
    ///
    /// A section reports a conflict for every pair of trains whose
    /// occupancies come within the safety margin of each other, once more
    /// trains overlap than the section's capacity allows. Each unordered
    /// pair is reported at most once per section.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSection` if a route names a section not in
    /// `sections`, or `Error::DuplicateSection` if section ids repeat.
    pub fn detect(&self, trains: &[Train], sections: &[TrackSection]) -> Result<Vec<Conflict>> {
        #[cfg(feature = "perf_timing")]
        let detect_start = std::time::Instant::now();

        let index = resolve_network(trains, sections)?;
        let timelines = build_section_timelines(trains, index.keys().copied());

        let mut conflicts = Vec::new();
        for (section_id, occupancies) in &timelines {
            let Some(section) = index.get(section_id) else {
                continue;
            };
            self.detect_section_conflicts(section, occupancies, &mut conflicts);
        }

        log!("Found {} conflicts among {} trains", conflicts.len(), trains.len());

        #[cfg(feature = "perf_timing")]
        log!("  Detection time: {:?}", detect_start.elapsed());

        Ok(conflicts)
    }

    /// Summarize a conflict list; empty input gives a zeroed summary
    #[must_use]
    pub fn summarize(&self, conflicts: &[Conflict]) -> ConflictSummary {
        ConflictSummary::from_conflicts(conflicts)
    }

    fn detect_section_conflicts(
        &self,
        section: &TrackSection,
        occupancies: &[Occupancy],
        conflicts: &mut Vec<Conflict>,
    ) {
        let margin = minutes(self.safety_margin_minutes);
        let capacity = usize::try_from(section.capacity).unwrap_or(usize::MAX);
        let mut reported: HashSet<(&str, &str)> = HashSet::new();

        for (i, occ_i) in occupancies.iter().enumerate() {
            // Other trains sharing the section with this one (margin included)
            let overlapping: Vec<usize> = occupancies
                .iter()
                .enumerate()
                .filter(|(j, occ_j)| {
                    *j != i
                        && occ_j.train.train_id != occ_i.train.train_id
                        && occ_i.overlaps_with_margin(occ_j, margin)
                })
                .map(|(j, _)| j)
                .collect();

            // Together with this train, the section is over capacity
            if overlapping.len() < capacity {
                continue;
            }

            for j in overlapping {
                let (first, second) = if i < j {
                    (&occupancies[i], &occupancies[j])
                } else {
                    (&occupancies[j], &occupancies[i])
                };
                let (a, b) = (first.train.train_id.as_str(), second.train.train_id.as_str());
                // Unordered: a train revisiting the section may meet the same peer twice
                let pair = if a <= b { (a, b) } else { (b, a) };
                if reported.contains(&pair) {
                    continue;
                }
                if let Some(conflict) = build_conflict(section, first, second) {
                    reported.insert(pair);
                    conflicts.push(conflict);
                }
            }
        }
    }
}

/// Escape `%` and `-` so the parts of a conflict id can't run together
fn id_part(id: &str) -> Cow<'_, str> {
    if id.contains(|c: char| c == '%' || c == '-') {
        Cow::Owned(id.replace('%', "%25").replace('-', "%2D"))
    } else {
        Cow::Borrowed(id)
    }
}

/// Conflict for the actual (unmargined) overlap, or `None` if the two
/// occupancies only come close without overlapping
fn build_conflict(section: &TrackSection, first: &Occupancy, second: &Occupancy) -> Option<Conflict> {
    let conflict_start = first.start.max(second.start);
    let conflict_end = first.end.min(second.end);
    if conflict_start >= conflict_end {
        return None;
    }

    let severity = calculate_severity(
        first.train.priority,
        second.train.priority,
        conflict_end - conflict_start,
        section.section_type,
    );

    Some(Conflict {
        conflict_id: format!(
            "C-{}-{}-{}",
            id_part(&section.section_id),
            id_part(&first.train.train_id),
            id_part(&second.train.train_id)
        ),
        train1: ConflictParty::from(first.train),
        train2: ConflictParty::from(second.train),
        section_id: section.section_id.clone(),
        section_type: section.section_type,
        conflict_start_time: conflict_start,
        conflict_end_time: conflict_end,
        severity,
    })
}
