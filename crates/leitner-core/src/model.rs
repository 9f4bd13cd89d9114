//! Schedule state model: settings, the seven review levels, and the
//! append-only action log.
//!
//! The wire form is UTF-8 JSON with camelCase field names; that exact shape
//! is what the migration/validation pipeline in [`crate::migrate`] accepts
//! and what exports produce.

use serde::{Deserialize, Serialize};

use crate::date::CalendarDate;

/// Number of review levels; fixed, never configurable.
pub const LEVEL_COUNT: usize = 7;

/// Review interval in days for levels 1..=7. Fixed at schedule creation.
pub const DEFAULT_INTERVALS: [u32; LEVEL_COUNT] = [1, 2, 4, 8, 16, 32, 64];

/// Current schema version of the persisted blob.
///
/// Increment this when adding a migration step in [`crate::migrate`].
pub const CURRENT_VERSION: u32 = 3;

/// Appearance preference. Stored with the schedule; rendering it is the
/// frontend's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::System => "system",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a user-supplied theme name.
    pub fn parse(s: &str) -> Option<Theme> {
        match s {
            "system" => Some(Theme::System),
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Schedule-wide settings.
///
/// `start_date` is `None` only in pre-initialization (welcome) mode; a
/// persisted blob always carries a concrete start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub start_date: Option<CalendarDate>,
    pub intervals: [u32; LEVEL_COUNT],
    pub theme: Theme,
    pub version: u32,
}

/// One of the seven review buckets.
///
/// `next_due` is the sole authority for whether the level is actionable on
/// a given day. `last_completed` is a display and idempotency hint only;
/// the log is authoritative for history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub level: u8,
    pub next_due: CalendarDate,
    pub last_completed: Option<CalendarDate>,
}

/// Action recorded in the log. Only completions are recorded; an undo
/// removes its entry rather than appending a compensating one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Done,
}

/// One completed review.
///
/// `original_due` is the level's `next_due` immediately prior to the
/// completion; it is what makes undo exact (restore, not recompute).
/// `ts` breaks ties among same-day entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub date: CalendarDate,
    pub level: u8,
    pub ts: i64,
    pub action: LogAction,
    pub original_due: CalendarDate,
}

/// The whole persisted schedule: settings, exactly seven levels ordered by
/// number, and the append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleState {
    pub settings: Settings,
    pub levels: Vec<Level>,
    pub log: Vec<LogEntry>,
}

impl ScheduleState {
    /// Create a fresh schedule starting on `start`.
    ///
    /// Level `i` first comes due `intervals[i-1] - 1` days after the start
    /// date, staggering the first rollout so the seven levels do not all
    /// land on day one: level 1 is due on the start date itself, level 7
    /// sixty-three days later.
    pub fn initialize(start: CalendarDate) -> Self {
        let levels = (1..=LEVEL_COUNT as u8)
            .map(|number| {
                let offset = DEFAULT_INTERVALS[number as usize - 1] as i64 - 1;
                Level {
                    level: number,
                    next_due: start.add_days(offset),
                    last_completed: None,
                }
            })
            .collect();
        ScheduleState {
            settings: Settings {
                start_date: Some(start),
                intervals: DEFAULT_INTERVALS,
                theme: Theme::System,
                version: CURRENT_VERSION,
            },
            levels,
            log: Vec::new(),
        }
    }

    /// The pre-initialization (welcome) state: no start date, no levels,
    /// no history. Never persisted; reset deletes the stored blob instead.
    pub fn welcome() -> Self {
        ScheduleState {
            settings: Settings {
                start_date: None,
                intervals: DEFAULT_INTERVALS,
                theme: Theme::System,
                version: CURRENT_VERSION,
            },
            levels: Vec::new(),
            log: Vec::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.settings.start_date.is_some()
    }

    pub fn level(&self, number: u8) -> Option<&Level> {
        self.levels.iter().find(|l| l.level == number)
    }

    pub fn level_mut(&mut self, number: u8) -> Option<&mut Level> {
        self.levels.iter_mut().find(|l| l.level == number)
    }

    /// Interval in days for the given level number, if it exists.
    pub fn interval_for(&self, number: u8) -> Option<u32> {
        if (1..=LEVEL_COUNT as u8).contains(&number) {
            self.settings.intervals.get(number as usize - 1).copied()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    #[test]
    fn initialize_staggers_first_due_dates() {
        let state = ScheduleState::initialize(d("2024-01-01"));
        assert_eq!(state.levels.len(), LEVEL_COUNT);
        assert_eq!(state.level(1).unwrap().next_due, d("2024-01-01"));
        assert_eq!(state.level(2).unwrap().next_due, d("2024-01-02"));
        assert_eq!(state.level(3).unwrap().next_due, d("2024-01-04"));
        assert_eq!(state.level(7).unwrap().next_due, d("2024-03-04"));
        assert!(state.levels.iter().all(|l| l.last_completed.is_none()));
        assert!(state.log.is_empty());
        assert_eq!(state.settings.version, CURRENT_VERSION);
    }

    #[test]
    fn welcome_state_has_no_start_date() {
        let state = ScheduleState::welcome();
        assert!(!state.is_initialized());
        assert!(state.levels.is_empty());
        assert!(state.log.is_empty());
    }

    #[test]
    fn wire_format_uses_camel_case_fields() {
        let state = ScheduleState::initialize(d("2024-01-01"));
        let json = serde_json::to_value(&state).unwrap();
        assert!(json["settings"].get("startDate").is_some());
        assert_eq!(json["settings"]["theme"], "system");
        assert!(json["levels"][0].get("nextDue").is_some());
        assert!(json["levels"][0].get("lastCompleted").is_some());
    }

    #[test]
    fn log_entry_serializes_done_action() {
        let entry = LogEntry {
            date: d("2024-01-01"),
            level: 1,
            ts: 1704067200000,
            action: LogAction::Done,
            original_due: d("2024-01-01"),
        };
        let json = serde_json::to_value(entry).unwrap();
        assert_eq!(json["action"], "done");
        assert_eq!(json["originalDue"], "2024-01-01");
    }

    #[test]
    fn interval_for_rejects_out_of_range_numbers() {
        let state = ScheduleState::initialize(d("2024-01-01"));
        assert_eq!(state.interval_for(1), Some(1));
        assert_eq!(state.interval_for(7), Some(64));
        assert_eq!(state.interval_for(0), None);
        assert_eq!(state.interval_for(8), None);
    }
}
