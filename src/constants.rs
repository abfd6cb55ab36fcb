use chrono::{NaiveDate, NaiveDateTime};

/// Base date used for sample data and tests
pub const BASE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2024, 1, 1) {
    Some(date) => date,
    None => panic!("Invalid base date"),
};

/// Base midnight datetime (`BASE_DATE` at 00:00:00)
pub const BASE_MIDNIGHT: NaiveDateTime = match BASE_DATE.and_hms_opt(0, 0, 0) {
    Some(dt) => dt,
    None => panic!("Invalid base midnight"),
};

/// Traversal time assumed for a route section with no explicit estimate
pub const DEFAULT_SECTION_MINUTES: u32 = 10;

/// Minimum gap between two trains using the same section
pub const DEFAULT_SAFETY_MARGIN_MINUTES: u32 = 5;

/// A train delayed by at most this much still counts as punctual
pub const DEFAULT_ON_TIME_THRESHOLD_MINUTES: u32 = 5;

/// Default top speed for trains that don't state one
pub const DEFAULT_MAX_SPEED_KMH: u32 = 100;

// Conflict severity scale
pub const BASE_SEVERITY: u8 = 2;
pub const MAX_SEVERITY: u8 = 5;
pub const CRITICAL_SEVERITY: u8 = 4;

/// Extra minutes added on top of an overlap when suggesting a delay
pub const RESOLUTION_DELAY_PADDING_MINUTES: i64 = 5;
