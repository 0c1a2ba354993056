//! Timestamp utilities

use chrono::{DateTime, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Calendar day (UTC) of a timestamp
///
/// Enrollment dates are compared at day precision; hours, minutes and
/// sub-second components are ignored.
pub fn day_of(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// True when both timestamps fall on the same UTC day
pub fn same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    day_of(a) == day_of(b)
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_same_day_ignores_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 1).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 4, 1, 23, 59, 59).unwrap();
        assert!(same_day(morning, evening));
    }

    #[test]
    fn test_same_day_ignores_sub_second() {
        let a = Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap();
        let b = a + chrono::Duration::milliseconds(999);
        assert!(same_day(a, b));
    }

    #[test]
    fn test_different_days() {
        let a = Utc.with_ymd_and_hms(2024, 4, 1, 23, 59, 59).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap();
        assert!(!same_day(a, b));
        assert!(day_of(a) < day_of(b));
    }

    #[test]
    fn test_millis_to_duration_one_second() {
        let duration = millis_to_duration(1000);
        assert_eq!(duration, Duration::from_secs(1));
    }

    #[test]
    fn test_millis_to_duration_max_u64() {
        // Should handle maximum u64 value without panic
        let duration = millis_to_duration(u64::MAX);
        assert_eq!(duration.as_millis(), u64::MAX as u128);
    }
}
