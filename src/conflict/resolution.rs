//! Advisory resolution suggestions for detected conflicts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use super::types::Conflict;
use crate::constants::RESOLUTION_DELAY_PADDING_MINUTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStrategy {
    DelayLowerPriority,
    RouteAlternative,
    SpeedAdjustment,
}

impl ResolutionStrategy {
    /// Strategies to offer for a conflict, most relevant first
    #[must_use]
    pub fn for_conflict(conflict: &Conflict) -> [Self; 2] {
        if conflict.is_critical() {
            [Self::DelayLowerPriority, Self::RouteAlternative]
        } else {
            [Self::SpeedAdjustment, Self::DelayLowerPriority]
        }
    }

    #[must_use]
    pub fn describe(self, conflict: &Conflict) -> String {
        match self {
            Self::DelayLowerPriority => {
                let (yielding, precedence) = conflict.precedence_order();
                let delay_minutes = conflict.duration_minutes() + RESOLUTION_DELAY_PADDING_MINUTES;
                format!(
                    "Delay train {} by {} minutes to give precedence to higher priority train {}",
                    yielding.train_number, delay_minutes, precedence.train_number
                )
            }
            Self::RouteAlternative => format!(
                "Consider alternative routing for one of the trains to avoid section {}",
                conflict.section_id
            ),
            Self::SpeedAdjustment => format!(
                "Adjust speed of trains to minimize overlap in section {}",
                conflict.section_id
            ),
        }
    }
}

/// Turns conflicts into human-readable suggestions. Never touches the
/// trains or the conflicts themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Suggestions per conflict id, in conflict order
    #[must_use]
    pub fn suggest(&self, conflicts: &[Conflict]) -> IndexMap<String, Vec<String>> {
        conflicts
            .iter()
            .map(|conflict| {
                let suggestions = ResolutionStrategy::for_conflict(conflict)
                    .into_iter()
                    .map(|strategy| strategy.describe(conflict))
                    .collect();
                (conflict.conflict_id.clone(), suggestions)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictParty;
    use crate::constants::BASE_DATE;
    use crate::models::{Priority, SectionType};

    fn conflict(severity: u8, priority1: Priority, priority2: Priority) -> Conflict {
        Conflict {
            conflict_id: "C-S1-A-B".to_string(),
            train1: ConflictParty {
                train_id: "A".to_string(),
                train_number: "12345".to_string(),
                priority: priority1,
            },
            train2: ConflictParty {
                train_id: "B".to_string(),
                train_number: "FR001".to_string(),
                priority: priority2,
            },
            section_id: "S1".to_string(),
            section_type: SectionType::SingleLine,
            conflict_start_time: BASE_DATE.and_hms_opt(8, 10, 0).expect("valid time"),
            conflict_end_time: BASE_DATE.and_hms_opt(8, 20, 0).expect("valid time"),
            severity,
        }
    }

    #[test]
    fn test_critical_conflict_suggests_delay_then_reroute() {
        let suggestions = ConflictResolver::new().suggest(&[conflict(4, Priority::High, Priority::Low)]);
        let list = &suggestions["C-S1-A-B"];
        assert_eq!(list.len(), 2);
        assert_eq!(
            list[0],
            "Delay train FR001 by 15 minutes to give precedence to higher priority train 12345"
        );
        assert_eq!(
            list[1],
            "Consider alternative routing for one of the trains to avoid section S1"
        );
    }

    #[test]
    fn test_minor_conflict_suggests_speed_then_delay() {
        let suggestions = ConflictResolver::new().suggest(&[conflict(3, Priority::Low, Priority::High)]);
        let list = &suggestions["C-S1-A-B"];
        assert_eq!(list[0], "Adjust speed of trains to minimize overlap in section S1");
        // train1 is the weaker one here
        assert!(list[1].starts_with("Delay train 12345 by 15 minutes"));
    }

    #[test]
    fn test_equal_priority_delays_first_train() {
        let c = conflict(2, Priority::Medium, Priority::Medium);
        let (yielding, _) = c.precedence_order();
        assert_eq!(yielding.train_id, "A");
    }

    #[test]
    fn test_suggest_empty() {
        assert!(ConflictResolver::new().suggest(&[]).is_empty());
    }
}
