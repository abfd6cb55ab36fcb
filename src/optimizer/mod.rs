//! Priority-first greedy rescheduling.
//!
//! Trains are placed one at a time, strongest precedence first. Each train
//! walks its route and is pushed back just enough to clear every stronger,
//! already placed train it would meet, plus the safety margin. Placed trains
//! are never revisited, so the result is not guaranteed to be conflict free:
//! `OptimizationResult::conflicts_remaining` is the authoritative answer.

mod metrics;
mod what_if;

pub use metrics::OptimizationMetrics;
pub use what_if::{ScenarioImpact, ScenarioReport, WhatIfAnalyzer};

use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use crate::conflict::{build_section_timelines, Conflict, ConflictDetector};
use crate::error::Result;
use crate::log;
use crate::models::{resolve_network, Schedule, SectionIndex, TrackSection, Train};
use crate::settings::EngineSettings;
use crate::time::{ceil_minutes, minutes};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Working copies in placement order (priority, then effective arrival)
    pub optimized_trains: Vec<Train>,
    /// One schedule per provided section, in section order
    pub schedule: IndexMap<String, Schedule>,
    pub metrics: OptimizationMetrics,
    pub conflicts_remaining: Vec<Conflict>,
}

/// Capacity-aware clash test used when deciding whether a weaker train must
/// wait. Single-capacity sections keep the safety margin on both sides;
/// wider sections only look at the raw overlap.
fn occupancies_clash(
    (start1, end1): (NaiveDateTime, NaiveDateTime),
    (start2, end2): (NaiveDateTime, NaiveDateTime),
    margin: Duration,
    capacity: u32,
) -> bool {
    if capacity == 1 {
        !(end1 + margin <= start2 || end2 + margin <= start1)
    } else {
        !(end1 <= start2 || end2 <= start1)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleOptimizer {
    settings: EngineSettings,
    detector: ConflictDetector,
}

impl ScheduleOptimizer {
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            detector: ConflictDetector::from_settings(&settings),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[must_use]
    pub fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    /// Optimize a copy of `trains`; the caller's trains are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSection` if a route names a section not in
    /// `sections`, or `Error::DuplicateSection` if section ids repeat.
    pub fn optimize(&self, trains: &[Train], sections: &[TrackSection]) -> Result<OptimizationResult> {
        #[cfg(feature = "perf_timing")]
        let optimize_start = std::time::Instant::now();

        let index = resolve_network(trains, sections)?;

        let mut working = trains.to_vec();
        working.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.effective_arrival().cmp(&b.effective_arrival()))
        });

        let optimized_trains = self.apply_greedy_optimization(working, &index);
        let schedule = generate_schedule(&optimized_trains, &index, true);

        let original_conflicts = self.detector.detect(trains, sections)?;
        let conflicts_remaining = self.detector.detect(&optimized_trains, sections)?;

        let metrics = OptimizationMetrics::calculate(
            trains,
            &optimized_trains,
            original_conflicts.len(),
            conflicts_remaining.len(),
            self.settings.on_time_threshold_minutes,
        );

        log!(
            "Optimized {} trains: {} -> {} conflicts, {} min added delay",
            metrics.total_trains,
            metrics.original_conflicts,
            metrics.optimized_conflicts,
            metrics.additional_delay_introduced
        );

        #[cfg(feature = "perf_timing")]
        log!("  Optimization time: {:?}", optimize_start.elapsed());

        Ok(OptimizationResult {
            optimized_trains,
            schedule,
            metrics,
            conflicts_remaining,
        })
    }

    /// Place trains in order, delaying each one against those already placed
    fn apply_greedy_optimization(&self, working: Vec<Train>, index: &SectionIndex<'_>) -> Vec<Train> {
        let mut placed: Vec<Train> = Vec::with_capacity(working.len());

        for mut train in working {
            let delay = self.required_delay(&train, &placed, index);
            if delay > 0 {
                log!("Delaying {} by {} min", train.train_id, delay);
                train.current_delay_minutes = train.current_delay_minutes.saturating_add(delay);
            }
            placed.push(train);
        }

        placed
    }

    /// Delay needed for `train` to clear every stronger placed train on its
    /// route. The offset accumulates along the route: a delay picked up in
    /// one section shifts every later section too.
    fn required_delay(&self, train: &Train, placed: &[Train], index: &SectionIndex<'_>) -> u32 {
        let margin = minutes(self.settings.safety_margin_minutes);
        let mut total_delay: u32 = 0;

        for (section_id, start, end) in train.section_occupancies() {
            let Some(section) = index.get(section_id) else {
                continue;
            };
            let offset = minutes(total_delay);
            let planned = (start + offset, end + offset);

            let section_delay = placed
                .iter()
                .filter(|other| train.priority.is_weaker_than(other.priority))
                .filter_map(|other| other.occupancy_in(section_id))
                .filter(|&occupied| occupancies_clash(planned, occupied, margin, section.capacity))
                .map(|(_, other_end)| ceil_minutes(other_end + margin - planned.0))
                .max()
                .unwrap_or(0);

            total_delay = total_delay.saturating_add(section_delay);
        }

        total_delay
    }
}

/// One schedule per section, in section order, with a slot for every visit
/// of every train (a route that passes a section twice gets two slots).
///
/// # Errors
///
/// Returns `Error::UnknownSection` if a route names a section not in
/// `sections`, or `Error::DuplicateSection` if section ids repeat.
pub fn build_schedules(trains: &[Train], sections: &[TrackSection]) -> Result<IndexMap<String, Schedule>> {
    let index = resolve_network(trains, sections)?;
    Ok(generate_schedule(trains, &index, false))
}

/// Replay every train's route into per-section slot lists
fn generate_schedule(trains: &[Train], index: &SectionIndex<'_>, optimized: bool) -> IndexMap<String, Schedule> {
    build_section_timelines(trains, index.keys().copied())
        .into_iter()
        .map(|(section_id, occupancies)| {
            let mut schedule = Schedule::new(section_id);
            schedule.optimized = optimized;
            for occupancy in occupancies {
                schedule.add_train_slot(occupancy.train, occupancy.start, occupancy.end);
            }
            (section_id.to_string(), schedule)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BASE_DATE;
    use crate::error::Error;
    use crate::models::{Priority, SectionType, TrainType};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        BASE_DATE.and_hms_opt(h, m, 0).expect("valid time")
    }

    fn sections(capacity: u32) -> Vec<TrackSection> {
        vec![
            TrackSection::new("S1", "Approach", SectionType::DoubleLine, 4.0, 120, 2),
            TrackSection::new("S2", "Bottleneck", SectionType::SingleLine, 2.0, 80, capacity),
        ]
    }

    fn train(id: &str, priority: Priority, route: &[&str], arrival: NaiveDateTime, section_minutes: u32) -> Train {
        let total = section_minutes * u32::try_from(route.len()).expect("short route");
        Train::new(
            id,
            format!("N{id}"),
            TrainType::Local,
            priority,
            route.iter().map(ToString::to_string).collect(),
            arrival,
            arrival + minutes(total),
        )
        .with_section_times(route.iter().map(|section| (*section, section_minutes)))
    }

    #[test]
    fn test_optimize_empty() {
        let result = ScheduleOptimizer::default().optimize(&[], &sections(1)).expect("valid input");
        assert!(result.optimized_trains.is_empty());
        assert!(result.conflicts_remaining.is_empty());
        assert_eq!(result.metrics.total_trains, 0);
        assert_eq!(result.metrics.throughput_trains_per_hour, 0.0);
        assert_eq!(result.metrics.punctuality_percentage, 0.0);
        // Every section still gets an (empty) schedule
        assert_eq!(result.schedule.len(), 2);
        assert!(result.schedule["S2"].train_slots.is_empty());
    }

    #[test]
    fn test_weaker_train_waits_for_stronger() {
        let a = train("A", Priority::High, &["S2"], at(8, 0), 20);
        let b = train("B", Priority::Low, &["S2"], at(8, 10), 20);
        let optimizer = ScheduleOptimizer::new(EngineSettings::with_safety_margin(5));

        let result = optimizer.optimize(&[b, a], &sections(1)).expect("valid input");
        let optimized_a = &result.optimized_trains[0];
        let optimized_b = &result.optimized_trains[1];

        assert_eq!(optimized_a.train_id, "A");
        assert_eq!(optimized_a.current_delay_minutes, 0);
        assert_eq!(optimized_b.current_delay_minutes, 15);
        let (b_start, _) = optimized_b.occupancy_in("S2").expect("route uses S2");
        assert!(b_start >= at(8, 25));
        assert!(result.conflicts_remaining.is_empty());
        assert_eq!(result.metrics.original_conflicts, 1);
        assert_eq!(result.metrics.optimized_conflicts, 0);
        assert_eq!(result.metrics.conflicts_reduced, 1);
        assert_eq!(result.metrics.optimization_effectiveness, 100.0);
    }

    #[test]
    fn test_stronger_train_is_never_delayed() {
        // The critical train arrives later but is placed first
        let freight = train("F", Priority::Low, &["S2"], at(8, 0), 30);
        let critical = train("X", Priority::Critical, &["S2"], at(8, 10), 10);
        let result = ScheduleOptimizer::default().optimize(&[freight, critical], &sections(1)).expect("valid input");

        let x = result.optimized_trains.iter().find(|t| t.train_id == "X").expect("present");
        let f = result.optimized_trains.iter().find(|t| t.train_id == "F").expect("present");
        assert_eq!(x.current_delay_minutes, 0);
        // 08:20 + 5 margin - 08:00
        assert_eq!(f.current_delay_minutes, 25);
    }

    #[test]
    fn test_equal_priority_is_not_delayed() {
        let a = train("A", Priority::Medium, &["S2"], at(8, 0), 20);
        let b = train("B", Priority::Medium, &["S2"], at(8, 10), 20);
        let result = ScheduleOptimizer::default().optimize(&[a, b], &sections(1)).expect("valid input");

        assert!(result.optimized_trains.iter().all(|t| t.current_delay_minutes == 0));
        // Greedy pass leaves this one for the caller
        assert_eq!(result.conflicts_remaining.len(), 1);
    }

    #[test]
    fn test_delay_accumulates_along_route() {
        // B meets A in S2 only after its stay in S1
        let a = train("A", Priority::High, &["S2"], at(8, 10), 20);
        let b = train("B", Priority::Low, &["S1", "S2"], at(8, 0), 10);
        let result = ScheduleOptimizer::default().optimize(&[a, b], &sections(1)).expect("valid input");

        let b = result.optimized_trains.iter().find(|t| t.train_id == "B").expect("present");
        // Planned S2 entry 08:10, must wait for 08:30 + 5
        assert_eq!(b.current_delay_minutes, 25);
        assert!(result.conflicts_remaining.is_empty());
    }

    #[test]
    fn test_wide_section_ignores_margin() {
        // A leaves at 08:20, B arrives 08:22: only the margin separates them
        let a = train("A", Priority::High, &["S2"], at(8, 0), 20);
        let b = train("B", Priority::Low, &["S2"], at(8, 22), 20);
        let narrow = ScheduleOptimizer::default().optimize(&[a.clone(), b.clone()], &sections(1)).expect("valid input");
        let wide = ScheduleOptimizer::default().optimize(&[a, b], &sections(2)).expect("valid input");

        assert_eq!(narrow.optimized_trains[1].current_delay_minutes, 3);
        assert_eq!(wide.optimized_trains[1].current_delay_minutes, 0);
    }

    #[test]
    fn test_delay_never_decreases() {
        let a = train("A", Priority::High, &["S1", "S2"], at(8, 0), 15).with_delay(7);
        let b = train("B", Priority::Lowest, &["S2"], at(8, 5), 15).with_delay(3);
        let c = train("C", Priority::Medium, &["S1"], at(9, 0), 15);
        let originals = vec![a, b, c];
        let result = ScheduleOptimizer::default().optimize(&originals, &sections(1)).expect("valid input");

        for original in &originals {
            let optimized = result
                .optimized_trains
                .iter()
                .find(|t| t.train_id == original.train_id)
                .expect("present");
            assert!(optimized.current_delay_minutes >= original.current_delay_minutes);
        }
        // Caller's trains untouched
        assert_eq!(originals[1].current_delay_minutes, 3);
    }

    #[test]
    fn test_schedule_slots_follow_optimized_times() {
        let a = train("A", Priority::High, &["S2"], at(8, 0), 20);
        let b = train("B", Priority::Low, &["S1", "S2"], at(8, 0), 10);
        let result = ScheduleOptimizer::default().optimize(&[a, b], &sections(1)).expect("valid input");

        let s2 = &result.schedule["S2"];
        assert!(s2.optimized);
        assert_eq!(s2.train_slots.len(), 2);
        assert_eq!(s2.train_slots[0].train_id, "A");
        assert_eq!(s2.occupancy_at(at(8, 10)), vec!["A"]);
        let b_slot = &s2.train_slots[1];
        assert_eq!(b_slot.start_time, at(8, 25));
        assert!(s2.occupancy_at(at(8, 22)).is_empty());
    }

    #[test]
    fn test_build_schedules_keeps_every_visit() {
        let shuttle = train("A", Priority::Medium, &["S1", "S2", "S1"], at(8, 0), 10);
        let schedules = build_schedules(&[shuttle], &sections(1)).expect("valid input");

        let s1 = &schedules["S1"];
        assert!(!s1.optimized);
        assert_eq!(s1.train_slots.len(), 2);
        assert_eq!(s1.train_slots[1].start_time, at(8, 20));
        assert_eq!(s1.occupancy_at(at(8, 25)), vec!["A"]);
        assert!(s1.occupancy_at(at(8, 15)).is_empty());
    }

    #[test]
    fn test_optimize_unknown_section() {
        let stray = train("A", Priority::High, &["S7"], at(8, 0), 20);
        let err = ScheduleOptimizer::default().optimize(&[stray], &sections(1)).expect_err("S7 is unknown");
        assert!(matches!(err, Error::UnknownSection { .. }));
    }
}
