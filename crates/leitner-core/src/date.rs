//! Calendar arithmetic over timezone-less dates.
//!
//! Scheduling runs entirely on calendar dates with no time-of-day or
//! timezone component, canonically written `YYYY-MM-DD`. All arithmetic is
//! done on [`chrono::NaiveDate`] in a single fixed frame (UTC midnight for
//! "today"), so adding days never drifts across DST transitions and two
//! dates are never compared after independently round-tripping through a
//! local-time representation.
//!
//! On the canonical form, lexicographic order equals chronological order,
//! which is what lets the engine compare serialized dates directly.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FormatError;

/// Canonical string form used everywhere: `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A date with no time-of-day or timezone component.
///
/// Ordering is chronological, which on the canonical string form is the
/// same as lexicographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build from year/month/day, rejecting impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(CalendarDate)
    }

    /// Add `n` calendar days; `n` may be negative.
    ///
    /// Correct across month and year boundaries, including leap days.
    pub fn add_days(self, n: i64) -> CalendarDate {
        let date = if n >= 0 {
            self.0
                .checked_add_days(Days::new(n as u64))
                .unwrap_or(NaiveDate::MAX)
        } else {
            self.0
                .checked_sub_days(Days::new(n.unsigned_abs()))
                .unwrap_or(NaiveDate::MIN)
        };
        CalendarDate(date)
    }

    /// Signed difference in days: `other - self`.
    pub fn diff_days(self, other: CalendarDate) -> i64 {
        (other.0 - self.0).num_days()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for CalendarDate {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(CalendarDate)
            .map_err(|_| FormatError(s.to_string()))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Wall-clock capability used by the engine.
///
/// Production uses [`SystemClock`]; tests inject a [`FixedClock`] so
/// scheduling transitions are deterministic without mocking system time.
pub trait Clock {
    /// The current calendar date in the fixed (UTC) frame.
    fn today(&self) -> CalendarDate;

    /// Wall-clock milliseconds since the Unix epoch, used for log
    /// entry tie-breaking.
    fn now_ms(&self) -> i64;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CalendarDate {
        CalendarDate(Utc::now().date_naive())
    }

    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock pinned to a fixed date and timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub today: CalendarDate,
    pub now_ms: i64,
}

impl Clock for FixedClock {
    fn today(&self) -> CalendarDate {
        self.today
    }

    fn now_ms(&self) -> i64 {
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display_roundtrip() {
        let date = d("2024-01-05");
        assert_eq!(date.to_string(), "2024-01-05");
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!("2024/01/05".parse::<CalendarDate>().is_err());
        assert!("not a date".parse::<CalendarDate>().is_err());
        assert!("2024-02-30".parse::<CalendarDate>().is_err());
        assert!("".parse::<CalendarDate>().is_err());
    }

    #[test]
    fn add_days_crosses_month_and_year_boundaries() {
        assert_eq!(d("2024-01-31").add_days(1), d("2024-02-01"));
        assert_eq!(d("2023-12-31").add_days(1), d("2024-01-01"));
        assert_eq!(d("2024-01-01").add_days(-1), d("2023-12-31"));
    }

    #[test]
    fn add_days_handles_leap_day() {
        assert_eq!(d("2024-02-28").add_days(1), d("2024-02-29"));
        assert_eq!(d("2023-02-28").add_days(1), d("2023-03-01"));
    }

    #[test]
    fn diff_days_is_signed() {
        assert_eq!(d("2024-01-01").diff_days(d("2024-01-05")), 4);
        assert_eq!(d("2024-01-05").diff_days(d("2024-01-01")), -4);
        assert_eq!(d("2024-01-05").diff_days(d("2024-01-05")), 0);
    }

    #[test]
    fn ordering_matches_lexicographic_form() {
        let a = d("2024-01-09");
        let b = d("2024-01-10");
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn fixed_clock_is_deterministic() {
        let clock = FixedClock {
            today: d("2024-06-01"),
            now_ms: 42,
        };
        assert_eq!(clock.today(), d("2024-06-01"));
        assert_eq!(clock.now_ms(), 42);
    }

    proptest! {
        #[test]
        fn diff_of_add_is_identity(
            year in 1970i32..2200,
            month in 1u32..=12,
            day in 1u32..=28,
            n in -100_000i64..100_000,
        ) {
            let date = CalendarDate::from_ymd(year, month, day).unwrap();
            prop_assert_eq!(date.diff_days(date.add_days(n)), n);
        }

        #[test]
        fn display_parse_roundtrip(
            year in 1i32..9999,
            month in 1u32..=12,
            day in 1u32..=28,
        ) {
            let date = CalendarDate::from_ymd(year, month, day).unwrap();
            prop_assert_eq!(date.to_string().parse::<CalendarDate>().unwrap(), date);
        }
    }
}
