//! Conflict severity scoring.

use chrono::Duration;
use crate::constants::{BASE_SEVERITY, MAX_SEVERITY};
use crate::models::{Priority, SectionType};

const LONG_CONFLICT_MINUTES: i64 = 30;
const VERY_LONG_CONFLICT_MINUTES: i64 = 60;

/// Score a conflict from 1 to 5.
///
/// Starts at 2, then adds:
/// - 2 if either train is critical, otherwise 1 if either is high priority
/// - 1 for an overlap over 30 minutes, 1 more over 60 minutes
/// - 1 on a junction or single-line section
#[must_use]
pub fn calculate_severity(
    priority1: Priority,
    priority2: Priority,
    overlap: Duration,
    section_type: SectionType,
) -> u8 {
    let mut severity = BASE_SEVERITY;

    match priority1.min(priority2) {
        Priority::Critical => severity += 2,
        Priority::High => severity += 1,
        _ => {}
    }

    if overlap > Duration::minutes(LONG_CONFLICT_MINUTES) {
        severity += 1;
    }
    if overlap > Duration::minutes(VERY_LONG_CONFLICT_MINUTES) {
        severity += 1;
    }

    if section_type.is_critical() {
        severity += 1;
    }

    severity.min(MAX_SEVERITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_severity() {
        let severity = calculate_severity(Priority::Medium, Priority::Low, Duration::minutes(10), SectionType::Platform);
        assert_eq!(severity, 2);
    }

    #[test]
    fn test_priority_bonus() {
        let high = calculate_severity(Priority::High, Priority::Low, Duration::minutes(10), SectionType::Platform);
        let critical = calculate_severity(Priority::Low, Priority::Critical, Duration::minutes(10), SectionType::Platform);
        assert_eq!(high, 3);
        assert_eq!(critical, 4);
    }

    #[test]
    fn test_duration_thresholds_are_monotonic() {
        let short = calculate_severity(Priority::Medium, Priority::Medium, Duration::minutes(30), SectionType::DoubleLine);
        let long = calculate_severity(Priority::Medium, Priority::Medium, Duration::minutes(31), SectionType::DoubleLine);
        let very_long = calculate_severity(Priority::Medium, Priority::Medium, Duration::minutes(61), SectionType::DoubleLine);
        assert_eq!(short, 2);
        assert_eq!(long, 3);
        assert_eq!(very_long, 4);
    }

    #[test]
    fn test_critical_section_bonus() {
        let junction = calculate_severity(Priority::Medium, Priority::Medium, Duration::minutes(5), SectionType::Junction);
        let single = calculate_severity(Priority::Medium, Priority::Medium, Duration::minutes(5), SectionType::SingleLine);
        assert_eq!(junction, 3);
        assert_eq!(single, 3);
    }

    #[test]
    fn test_severity_capped() {
        let severity = calculate_severity(Priority::Critical, Priority::High, Duration::minutes(90), SectionType::Junction);
        assert_eq!(severity, MAX_SEVERITY);
    }
}
