//! Core types for conflict detection.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use crate::constants::CRITICAL_SEVERITY;
use crate::models::{Priority, SectionType, Train};
use crate::time::minutes_between;

/// The part of a train a conflict needs to remember
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictParty {
    pub train_id: String,
    pub train_number: String,
    pub priority: Priority,
}

impl From<&Train> for ConflictParty {
    fn from(train: &Train) -> Self {
        Self {
            train_id: train.train_id.clone(),
            train_number: train.train_number.clone(),
            priority: train.priority,
        }
    }
}

/// Two trains wanting the same section at the same time. Created fresh by
/// every detection pass and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub conflict_id: String,
    pub train1: ConflictParty,
    pub train2: ConflictParty,
    pub section_id: String,
    pub section_type: SectionType,
    // Actual overlap of the two occupancies, without the safety margin
    pub conflict_start_time: NaiveDateTime,
    pub conflict_end_time: NaiveDateTime,
    /// 1 = low, 5 = critical
    pub severity: u8,
}

impl Conflict {
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.conflict_end_time - self.conflict_start_time
    }

    /// Overlap length in whole minutes, truncated
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        minutes_between(self.conflict_start_time, self.conflict_end_time)
    }

    #[must_use]
    pub fn involves(&self, train_id: &str) -> bool {
        self.train1.train_id == train_id || self.train2.train_id == train_id
    }

    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.severity >= CRITICAL_SEVERITY
    }

    /// Returns `(yielding, precedence)`: the weaker train first. On equal
    /// priority the first train yields.
    #[must_use]
    pub fn precedence_order(&self) -> (&ConflictParty, &ConflictParty) {
        if self.train1.priority < self.train2.priority {
            (&self.train2, &self.train1)
        } else {
            (&self.train1, &self.train2)
        }
    }
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Conflict: {} vs {} at {}",
            self.train1.train_number, self.train2.train_number, self.section_id
        )
    }
}

/// Aggregate view over a conflict list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSummary {
    pub total_conflicts: usize,
    pub severity_breakdown: BTreeMap<u8, usize>,
    pub sections_affected: BTreeSet<String>,
    /// Train numbers, not ids
    pub trains_affected: BTreeSet<String>,
    /// Conflicts with severity 4 or higher
    pub critical_conflicts: usize,
}

impl ConflictSummary {
    #[must_use]
    pub fn from_conflicts(conflicts: &[Conflict]) -> Self {
        let mut summary = Self::default();
        for conflict in conflicts {
            summary.total_conflicts += 1;
            *summary.severity_breakdown.entry(conflict.severity).or_insert(0) += 1;
            summary.sections_affected.insert(conflict.section_id.clone());
            summary.trains_affected.insert(conflict.train1.train_number.clone());
            summary.trains_affected.insert(conflict.train2.train_number.clone());
            if conflict.is_critical() {
                summary.critical_conflicts += 1;
            }
        }
        summary
    }
}
