use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive timestamp range, grown one observation at a time.
///
/// The import pipeline uses this for the diagnostics date range: start with
/// [`DateRange::single`] on the first record, then [`DateRange::expand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        DateRange { start, end }
    }

    pub fn single(ts: NaiveDateTime) -> Self {
        DateRange { start: ts, end: ts }
    }

    pub fn expand(&mut self, ts: NaiveDateTime) {
        if ts < self.start {
            self.start = ts;
        }
        if ts > self.end {
            self.end = ts;
        }
    }

    pub fn contains(self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn single_is_degenerate_range() {
        let r = DateRange::single(ts(2024, 3, 15));
        assert_eq!(r.start, r.end);
        assert!(r.contains(ts(2024, 3, 15)));
    }

    #[test]
    fn expand_moves_both_ends() {
        let mut r = DateRange::single(ts(2024, 3, 15));
        r.expand(ts(2024, 3, 1));
        r.expand(ts(2024, 3, 31));
        assert_eq!(r.start, ts(2024, 3, 1));
        assert_eq!(r.end, ts(2024, 3, 31));
    }

    #[test]
    fn expand_inside_range_is_noop() {
        let mut r = DateRange::new(ts(2024, 1, 1), ts(2024, 12, 31));
        r.expand(ts(2024, 6, 15));
        assert_eq!(r, DateRange::new(ts(2024, 1, 1), ts(2024, 12, 31)));
    }

    #[test]
    fn contains_is_inclusive() {
        let r = DateRange::new(ts(2024, 1, 1), ts(2024, 1, 31));
        assert!(r.contains(ts(2024, 1, 1)));
        assert!(r.contains(ts(2024, 1, 31)));
        assert!(!r.contains(ts(2024, 2, 1)));
    }

    #[test]
    fn display() {
        let r = DateRange::new(ts(2024, 1, 1), ts(2024, 1, 31));
        assert_eq!(r.to_string(), "2024-01-01 00:00:00 to 2024-01-31 00:00:00");
    }
}
