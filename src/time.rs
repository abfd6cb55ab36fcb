use chrono::{Duration, NaiveDateTime, NaiveTime};
use crate::constants::BASE_MIDNIGHT;

/// Duration of a whole number of minutes
#[must_use]
pub fn minutes(value: u32) -> Duration {
    Duration::minutes(i64::from(value))
}

/// Whole minutes between two instants, truncated toward zero
#[must_use]
pub fn minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    end.signed_duration_since(start).num_minutes()
}

/// Round a duration up to whole minutes, clamping negative durations to zero
#[must_use]
pub fn ceil_minutes(duration: Duration) -> u32 {
    let seconds = duration.num_seconds();
    if seconds <= 0 {
        return 0;
    }
    u32::try_from((seconds + 59) / 60).unwrap_or(u32::MAX)
}

/// Length of a duration in fractional hours
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn duration_hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / 3600.0
}

/// Parse a time string in HH:MM:SS format
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a valid time in HH:MM:SS format.
pub fn parse_time_hms(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
}

/// Parse an HH:MM:SS offset and place it on the base date
///
/// # Errors
///
/// Returns an error if the string is not a valid HH:MM:SS time.
pub fn parse_base_offset(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let time = parse_time_hms(s)?;
    Ok(BASE_MIDNIGHT.date().and_time(time))
}

/// Round to the given number of decimal places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BASE_DATE;
    use chrono::Timelike;

    #[test]
    fn test_minutes_between_truncates() {
        let start = BASE_DATE.and_hms_opt(8, 0, 0).expect("valid time");
        let end = BASE_DATE.and_hms_opt(8, 12, 59).expect("valid time");
        assert_eq!(minutes_between(start, end), 12);
        assert_eq!(minutes_between(end, start), -12);
    }

    #[test]
    fn test_ceil_minutes() {
        assert_eq!(ceil_minutes(Duration::seconds(0)), 0);
        assert_eq!(ceil_minutes(Duration::seconds(-90)), 0);
        assert_eq!(ceil_minutes(Duration::seconds(60)), 1);
        assert_eq!(ceil_minutes(Duration::seconds(61)), 2);
        assert_eq!(ceil_minutes(Duration::minutes(15)), 15);
    }

    #[test]
    fn test_duration_hours() {
        assert_eq!(duration_hours(Duration::minutes(90)), 1.5);
        assert_eq!(duration_hours(Duration::zero()), 0.0);
    }

    #[test]
    fn test_parse_time_hms_valid() {
        let time = parse_time_hms("14:30:45").expect("valid time");
        assert_eq!(time.hour(), 14);
        assert_eq!(time.minute(), 30);
        assert_eq!(time.second(), 45);
    }

    #[test]
    fn test_parse_time_hms_invalid() {
        assert!(parse_time_hms("25:00:00").is_err());
        assert!(parse_time_hms("invalid").is_err());
    }

    #[test]
    fn test_parse_base_offset() {
        let dt = parse_base_offset("01:15:00").expect("valid time");
        assert_eq!(dt, BASE_DATE.and_hms_opt(1, 15, 0).expect("valid time"));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(66.666_666, 1), 66.7);
        assert_eq!(round_to(1.234_5, 2), 1.23);
    }
}
