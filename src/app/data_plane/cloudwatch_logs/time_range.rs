//! Time range resolution
//!
//! Turns a [`TimeRange`] into the `[start, end)` pair of whole Unix seconds the
//! `StartQuery` API expects.

#![warn(clippy::all, rust_2018_idioms)]

use chrono::{DateTime, Utc};

use super::types::TimeRange;

impl TimeRange {
    /// Resolve to `(start, end)` in Unix seconds, sampling the clock once
    ///
    /// For relative ranges `end - start` is `amount * unit`, except when that
    /// would reach before the Unix epoch: `start` is then clamped to `0` and the
    /// span is shorter than requested.
    pub fn resolve(&self) -> (i64, i64) {
        self.resolve_at(Utc::now())
    }

    /// Resolve against an explicit "now"
    ///
    /// Sub-second precision is truncated. Absolute ranges are returned as-is,
    /// even when out of order. Relative ranges reaching before the epoch are
    /// clamped to zero.
    pub fn resolve_at(&self, now: DateTime<Utc>) -> (i64, i64) {
        match self {
            TimeRange::Absolute { start, end } => (start.timestamp(), end.timestamp()),
            TimeRange::Relative { amount, unit } => {
                let end = now.timestamp();
                let span = unit.seconds().saturating_mul(i64::from(*amount));
                (end.saturating_sub(span).max(0), end)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::TimeUnit;
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_absolute_range_is_verbatim() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();

        let range = TimeRange::absolute(start, end);
        assert_eq!(range.resolve(), (start.timestamp(), end.timestamp()));
    }

    #[test]
    fn test_absolute_range_truncates_fractional_seconds() {
        let start = Utc.timestamp_millis_opt(1_700_000_000_999).unwrap();
        let end = Utc.timestamp_millis_opt(1_700_000_100_001).unwrap();

        let range = TimeRange::absolute(start, end);
        assert_eq!(range.resolve(), (1_700_000_000, 1_700_000_100));
    }

    #[test]
    fn test_out_of_order_absolute_range_still_resolves() {
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let (resolved_start, resolved_end) = TimeRange::absolute(start, end).resolve();
        assert!(resolved_start > resolved_end);
    }

    #[test]
    fn test_relative_range_is_anchored_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 12, 30, 15).unwrap();

        for unit in TimeUnit::ALL {
            let (start, end) = TimeRange::relative(3, unit).resolve_at(now);
            assert_eq!(end, now.timestamp());
            assert_eq!(end - start, 3 * unit.seconds());
        }

        let (start, _) = TimeRange::relative(1, TimeUnit::Days).resolve_at(now);
        assert_eq!(start, (now - Duration::days(1)).timestamp());
    }

    #[test]
    fn test_relative_range_resolves_fresh_each_time() {
        let range = TimeRange::relative(1, TimeUnit::Hours);
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = earlier + Duration::seconds(90);

        let first = range.resolve_at(earlier);
        let second = range.resolve_at(later);
        assert_eq!(second.0 - first.0, 90);
        assert_eq!(second.1 - first.1, 90);
    }

    #[test]
    fn test_relative_range_before_epoch_is_clamped() {
        let now = Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap();
        let (start, end) = TimeRange::relative(u32::MAX, TimeUnit::Weeks).resolve_at(now);
        assert_eq!(start, 0);
        assert_eq!(end, 86_400);
    }

    #[test]
    fn test_resolving_twice_never_moves_backwards() {
        let range = TimeRange::relative(15, TimeUnit::Minutes);

        let (first_start, first_end) = range.resolve();
        let (second_start, second_end) = range.resolve();

        assert!(second_end >= first_end);
        assert!(second_start >= first_start);
        assert_eq!(first_end - first_start, 900);
        assert_eq!(second_end - second_start, 900);
    }
}
