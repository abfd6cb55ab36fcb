//! Performance metrics comparing an original train set with its optimized version.

use serde::{Deserialize, Serialize};
use crate::models::Train;
use crate::time::{duration_hours, round_to};

/// Field names are a stable contract for dashboards and reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationMetrics {
    pub total_trains: usize,
    pub original_conflicts: usize,
    pub optimized_conflicts: usize,
    /// Negative when optimization introduced conflicts
    pub conflicts_reduced: i64,
    pub original_total_delay: u64,
    pub optimized_total_delay: u64,
    pub additional_delay_introduced: i64,
    pub average_delay_per_train: f64,
    pub throughput_trains_per_hour: f64,
    pub punctuality_percentage: f64,
    pub optimization_effectiveness: f64,
}

#[allow(clippy::cast_possible_wrap)]
fn signed(value: u64) -> i64 {
    value as i64
}

fn total_delay(trains: &[Train]) -> u64 {
    trains.iter().map(|t| u64::from(t.current_delay_minutes)).sum()
}

/// Trains per hour over the span from the earliest effective arrival to
/// the latest effective departure; zero for an empty set or an empty span
fn throughput(trains: &[Train]) -> f64 {
    let earliest = trains.iter().map(Train::effective_arrival).min();
    let latest = trains.iter().map(Train::effective_departure).max();
    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        return 0.0;
    };

    let span_hours = duration_hours(latest - earliest);
    if span_hours <= 0.0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let count = trains.len() as f64;
    count / span_hours
}

impl OptimizationMetrics {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn calculate(
        original: &[Train],
        optimized: &[Train],
        original_conflicts: usize,
        optimized_conflicts: usize,
        on_time_threshold_minutes: u32,
    ) -> Self {
        let total_trains = original.len();
        let original_total_delay = total_delay(original);
        let optimized_total_delay = total_delay(optimized);
        let conflicts_reduced = signed(original_conflicts as u64) - signed(optimized_conflicts as u64);

        let (average_delay_per_train, punctuality_percentage) = if optimized.is_empty() {
            (0.0, 0.0)
        } else {
            let on_time = optimized
                .iter()
                .filter(|t| t.current_delay_minutes <= on_time_threshold_minutes)
                .count();
            (
                optimized_total_delay as f64 / optimized.len() as f64,
                on_time as f64 / optimized.len() as f64 * 100.0,
            )
        };

        Self {
            total_trains,
            original_conflicts,
            optimized_conflicts,
            conflicts_reduced,
            original_total_delay,
            optimized_total_delay,
            additional_delay_introduced: signed(optimized_total_delay) - signed(original_total_delay),
            average_delay_per_train,
            throughput_trains_per_hour: round_to(throughput(original), 2),
            punctuality_percentage: round_to(punctuality_percentage, 1),
            optimization_effectiveness: round_to(
                conflicts_reduced as f64 / original_conflicts.max(1) as f64 * 100.0,
                1,
            ),
        }
    }
}
