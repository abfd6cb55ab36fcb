#![allow(clippy::implicit_hasher)]
#![allow(unknown_lints)]

//! Conflict detection, greedy rescheduling and what-if analysis for trains
//! sharing the track sections of a controlled railway section.

pub mod constants;
pub mod logging;
pub mod error;
pub mod settings;
pub mod time;
pub mod models;
pub mod conflict;
pub mod optimizer;
pub mod data;

pub use conflict::{Conflict, ConflictDetector, ConflictResolver, ConflictSummary};
pub use error::{Error, Result};
pub use models::{Priority, Schedule, SectionController, SectionType, TrackSection, Train, TrainType};
pub use optimizer::{build_schedules, OptimizationMetrics, OptimizationResult, ScenarioReport, ScheduleOptimizer, WhatIfAnalyzer};
pub use settings::EngineSettings;

#[doc(hidden)]
pub mod __private {
    pub use ::log;
}
