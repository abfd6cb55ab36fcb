use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::constants::{DEFAULT_MAX_SPEED_KMH, DEFAULT_SECTION_MINUTES};
use crate::error::{Error, Result};
use crate::time::minutes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainType {
    Express,
    Local,
    Freight,
    Maintenance,
    Special,
}

/// Dispatching precedence. Lower ordinal means stronger precedence, and the
/// derived ordering follows the ordinal so `Critical < Lowest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical = 1,
    High = 2,
    Medium = 3,
    Low = 4,
    Lowest = 5,
}

impl Priority {
    pub const ALL: [Self; 5] = [Self::Critical, Self::High, Self::Medium, Self::Low, Self::Lowest];

    #[must_use]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.ordinal() == ordinal)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Lowest => "LOWEST",
        }
    }

    /// True if `self` yields to `other`
    #[must_use]
    pub fn is_weaker_than(self, other: Self) -> bool {
        self.ordinal() > other.ordinal()
    }
}

/// A train with its timetable and route through the section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub train_id: String,
    pub train_number: String,
    pub train_type: TrainType,
    pub priority: Priority,
    /// Section ids in traversal order
    pub route: Vec<String>,
    pub scheduled_arrival: NaiveDateTime,
    pub scheduled_departure: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_section: Option<String>,
    #[serde(default)]
    pub current_delay_minutes: u32,
    #[serde(default = "default_max_speed")]
    pub max_speed_kmh: u32,
    /// Traversal minutes per section; missing sections take the default
    #[serde(default)]
    pub estimated_section_times: HashMap<String, u32>,
}

fn default_max_speed() -> u32 {
    DEFAULT_MAX_SPEED_KMH
}

impl Train {
    #[must_use]
    pub fn new(
        train_id: impl Into<String>,
        train_number: impl Into<String>,
        train_type: TrainType,
        priority: Priority,
        route: Vec<String>,
        scheduled_arrival: NaiveDateTime,
        scheduled_departure: NaiveDateTime,
    ) -> Self {
        Self {
            train_id: train_id.into(),
            train_number: train_number.into(),
            train_type,
            priority,
            route,
            scheduled_arrival,
            scheduled_departure,
            current_section: None,
            current_delay_minutes: 0,
            max_speed_kmh: DEFAULT_MAX_SPEED_KMH,
            estimated_section_times: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_section_times<I, S>(mut self, times: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        self.estimated_section_times = times.into_iter().map(|(id, mins)| (id.into(), mins)).collect();
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay_minutes: u32) -> Self {
        self.current_delay_minutes = delay_minutes;
        self
    }

    #[must_use]
    pub fn effective_arrival(&self) -> NaiveDateTime {
        self.scheduled_arrival + minutes(self.current_delay_minutes)
    }

    #[must_use]
    pub fn effective_departure(&self) -> NaiveDateTime {
        self.scheduled_departure + minutes(self.current_delay_minutes)
    }

    /// Minutes the train needs to traverse the given section
    #[must_use]
    pub fn section_minutes(&self, section_id: &str) -> u32 {
        self.estimated_section_times
            .get(section_id)
            .copied()
            .unwrap_or(DEFAULT_SECTION_MINUTES)
    }

    /// Walk the route from the effective arrival, yielding `(section_id, start, end)`.
    /// The end of each section is the start of the next.
    pub fn section_occupancies(&self) -> impl Iterator<Item = (&str, NaiveDateTime, NaiveDateTime)> + '_ {
        let mut current = self.effective_arrival();
        self.route.iter().map(move |section_id| {
            let start = current;
            let end = start + minutes(self.section_minutes(section_id));
            current = end;
            (section_id.as_str(), start, end)
        })
    }

    /// Occupancy window of the first visit to `section_id`, if the route touches it
    #[must_use]
    pub fn occupancy_in(&self, section_id: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.section_occupancies()
            .find(|(id, _, _)| *id == section_id)
            .map(|(_, start, end)| (start, end))
    }

    /// Check the train is well formed on its own
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTrain` for an empty id, an empty route or a
    /// departure before the arrival
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidTrain {
            train_id: self.train_id.clone(),
            reason: reason.to_string(),
        };

        if self.train_id.trim().is_empty() {
            return Err(invalid("train id is empty"));
        }
        if self.route.is_empty() {
            return Err(invalid("route is empty"));
        }
        if self.scheduled_departure < self.scheduled_arrival {
            return Err(invalid("scheduled departure is before scheduled arrival"));
        }
        Ok(())
    }
}

impl std::fmt::Display for Train {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Train {} ({:?})", self.train_number, self.train_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BASE_DATE;

    fn test_train() -> Train {
        Train::new(
            "T001",
            "12345",
            TrainType::Express,
            Priority::High,
            vec!["SEC_001".to_string(), "SEC_002".to_string(), "SEC_003".to_string()],
            BASE_DATE.and_hms_opt(1, 0, 0).expect("valid time"),
            BASE_DATE.and_hms_opt(1, 30, 0).expect("valid time"),
        )
        .with_section_times([("SEC_001", 5), ("SEC_002", 15)])
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical < Priority::Lowest);
        assert!(Priority::Low.is_weaker_than(Priority::High));
        assert!(!Priority::High.is_weaker_than(Priority::High));
        assert_eq!(Priority::from_ordinal(3), Some(Priority::Medium));
        assert_eq!(Priority::from_ordinal(0), None);
        assert_eq!(Priority::from_ordinal(6), None);
    }

    #[test]
    fn test_effective_times_include_delay() {
        let train = test_train().with_delay(12);
        assert_eq!(train.effective_arrival(), BASE_DATE.and_hms_opt(1, 12, 0).expect("valid time"));
        assert_eq!(train.effective_departure(), BASE_DATE.and_hms_opt(1, 42, 0).expect("valid time"));
    }

    #[test]
    fn test_section_minutes_default() {
        let train = test_train();
        assert_eq!(train.section_minutes("SEC_001"), 5);
        assert_eq!(train.section_minutes("SEC_003"), DEFAULT_SECTION_MINUTES);
    }

    #[test]
    fn test_section_occupancies_are_contiguous() {
        let train = test_train();
        let occupancies: Vec<_> = train.section_occupancies().collect();
        assert_eq!(occupancies.len(), 3);
        assert_eq!(occupancies[0].1, BASE_DATE.and_hms_opt(1, 0, 0).expect("valid time"));
        for pair in occupancies.windows(2) {
            assert_eq!(pair[0].2, pair[1].1);
        }
        assert_eq!(occupancies[2].2, BASE_DATE.and_hms_opt(1, 30, 0).expect("valid time"));
    }

    #[test]
    fn test_occupancy_in() {
        let train = test_train();
        let (start, end) = train.occupancy_in("SEC_002").expect("route uses SEC_002");
        assert_eq!(start, BASE_DATE.and_hms_opt(1, 5, 0).expect("valid time"));
        assert_eq!(end, BASE_DATE.and_hms_opt(1, 20, 0).expect("valid time"));
        assert!(train.occupancy_in("SEC_009").is_none());
    }

    #[test]
    fn test_validate_rejects_empty_route() {
        let mut train = test_train();
        train.route.clear();
        assert!(matches!(train.validate(), Err(Error::InvalidTrain { .. })));
    }

    #[test]
    fn test_validate_rejects_departure_before_arrival() {
        let mut train = test_train();
        train.scheduled_departure = BASE_DATE.and_hms_opt(0, 30, 0).expect("valid time");
        assert!(train.validate().is_err());
    }

    #[test]
    fn test_deserialize_rejects_negative_delay() {
        let json = r#"{"train_id":"T1","train_number":"1","train_type":"LOCAL","priority":"MEDIUM",
            "route":["SEC_001"],"scheduled_arrival":"2024-01-01T01:00:00",
            "scheduled_departure":"2024-01-01T02:00:00","current_delay_minutes":-3}"#;
        assert!(serde_json::from_str::<Train>(json).is_err());
    }
}
