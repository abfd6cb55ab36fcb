use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use super::{Priority, Train, TrainType};

/// One train's occupancy of a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSlot {
    pub train_id: String,
    pub train_number: String,
    pub train_type: TrainType,
    pub priority: Priority,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// Derived occupancy plan for a single section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: String,
    pub section_id: String,
    pub train_slots: Vec<TrainSlot>,
    pub optimized: bool,
}

impl Schedule {
    #[must_use]
    pub fn new(section_id: &str) -> Self {
        Self {
            schedule_id: format!("SCH_{section_id}"),
            section_id: section_id.to_string(),
            train_slots: Vec::new(),
            optimized: false,
        }
    }

    pub fn add_train_slot(&mut self, train: &Train, start_time: NaiveDateTime, end_time: NaiveDateTime) {
        self.train_slots.push(TrainSlot {
            train_id: train.train_id.clone(),
            train_number: train.train_number.clone(),
            train_type: train.train_type,
            priority: train.priority,
            start_time,
            end_time,
        });
    }

    /// Ids of the trains occupying the section at `time` (slot bounds inclusive)
    #[must_use]
    pub fn occupancy_at(&self, time: NaiveDateTime) -> Vec<&str> {
        self.train_slots
            .iter()
            .filter(|slot| slot.start_time <= time && time <= slot.end_time)
            .map(|slot| slot.train_id.as_str())
            .collect()
    }

    /// Share of the section's capacity in use at `time`, as a percentage
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization_at(&self, time: NaiveDateTime, capacity: u32) -> f64 {
        if capacity == 0 {
            return 0.0;
        }
        self.occupancy_at(time).len() as f64 / f64::from(capacity) * 100.0
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Schedule for {} with {} slots", self.section_id, self.train_slots.len())
    }
}
