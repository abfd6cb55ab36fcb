//! What-if analysis: optimize a baseline and a single-train variation of it,
//! then compare the metrics.

use serde::{Deserialize, Serialize};
use super::{OptimizationMetrics, ScheduleOptimizer};
use crate::error::{Error, Result};
use crate::models::{Priority, TrackSection, Train};
use crate::time::round_to;

/// Scenario minus baseline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioImpact {
    pub conflicts_change: i64,
    pub delay_change: i64,
    pub punctuality_change: f64,
}

impl ScenarioImpact {
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn between(original: &OptimizationMetrics, scenario: &OptimizationMetrics) -> Self {
        Self {
            conflicts_change: scenario.optimized_conflicts as i64 - original.optimized_conflicts as i64,
            delay_change: scenario.optimized_total_delay as i64 - original.optimized_total_delay as i64,
            punctuality_change: round_to(scenario.punctuality_percentage - original.punctuality_percentage, 1),
        }
    }

    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.conflicts_change == 0 && self.delay_change == 0 && self.punctuality_change == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub train_id: String,
    pub description: String,
    pub original_metrics: OptimizationMetrics,
    pub scenario_metrics: OptimizationMetrics,
    pub impact: ScenarioImpact,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WhatIfAnalyzer {
    optimizer: ScheduleOptimizer,
}

impl WhatIfAnalyzer {
    #[must_use]
    pub fn new(optimizer: ScheduleOptimizer) -> Self {
        Self { optimizer }
    }

    /// Impact of delaying one train by `extra_minutes` on top of its current delay
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownTrain` if `train_id` isn't in `trains`, or any
    /// error the optimizer raises for the network
    pub fn analyze_delay(
        &self,
        trains: &[Train],
        sections: &[TrackSection],
        train_id: &str,
        extra_minutes: u32,
    ) -> Result<ScenarioReport> {
        let mut scenario = trains.to_vec();
        let target = find_train(&mut scenario, train_id)?;
        target.current_delay_minutes = target.current_delay_minutes.saturating_add(extra_minutes);

        let description = format!("Train {train_id} delayed by {extra_minutes} minutes");
        self.compare(trains, &scenario, sections, train_id, description)
    }

    /// Impact of running one train at a different priority
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownTrain` if `train_id` isn't in `trains`, or any
    /// error the optimizer raises for the network
    pub fn analyze_priority(
        &self,
        trains: &[Train],
        sections: &[TrackSection],
        train_id: &str,
        new_priority: Priority,
    ) -> Result<ScenarioReport> {
        let mut scenario = trains.to_vec();
        let target = find_train(&mut scenario, train_id)?;
        let original_priority = std::mem::replace(&mut target.priority, new_priority);

        let description = format!(
            "Train {train_id} priority changed from {} to {}",
            original_priority.name(),
            new_priority.name()
        );
        self.compare(trains, &scenario, sections, train_id, description)
    }

    fn compare(
        &self,
        original: &[Train],
        scenario: &[Train],
        sections: &[TrackSection],
        train_id: &str,
        description: String,
    ) -> Result<ScenarioReport> {
        let original_metrics = self.optimizer.optimize(original, sections)?.metrics;
        let scenario_metrics = self.optimizer.optimize(scenario, sections)?.metrics;
        let impact = ScenarioImpact::between(&original_metrics, &scenario_metrics);

        Ok(ScenarioReport {
            train_id: train_id.to_string(),
            description,
            original_metrics,
            scenario_metrics,
            impact,
        })
    }
}

fn find_train<'a>(trains: &'a mut [Train], train_id: &str) -> Result<&'a mut Train> {
    trains
        .iter_mut()
        .find(|t| t.train_id == train_id)
        .ok_or_else(|| Error::UnknownTrain(train_id.to_string()))
}
