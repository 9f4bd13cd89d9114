//! Scheduling engine: due-date classification and the complete/undo
//! transitions.
//!
//! The engine is synchronous, pure computation over a [`ScheduleState`]
//! passed in explicitly; it performs no I/O. Persisting the mutated state
//! is the caller's responsibility.
//!
//! ## Classification
//!
//! Rather than a flat "is it due" boolean, the seven levels are
//! partitioned into actionable / pending / upcoming. At most one level is
//! actionable at a time: the one with the earliest overdue-or-today due
//! date, ties broken by level number. That turns an unordered due-set into
//! a strictly ordered work queue, so the oldest backlog is always resolved
//! first and a fresher level can never be completed ahead of an older one.

use crate::date::CalendarDate;
use crate::error::{CoreError, Result};
use crate::model::{Level, LogAction, LogEntry, ScheduleState};

/// Tri-partition of the seven levels for a given observation date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The single level eligible for completion right now, if any.
    pub actionable: Option<Level>,
    /// Due levels blocked behind the actionable one, oldest first.
    pub pending: Vec<Level>,
    /// Levels due after today, ordered by due date then level number.
    pub upcoming: Vec<Level>,
}

impl ScheduleState {
    /// Partition all levels relative to `today`.
    ///
    /// Actionable, pending, and upcoming together cover every level
    /// exactly once.
    pub fn classify(&self, today: CalendarDate) -> Classification {
        let mut due: Vec<Level> = self
            .levels
            .iter()
            .filter(|l| l.next_due <= today)
            .copied()
            .collect();
        due.sort_by_key(|l| (l.next_due, l.level));

        let mut upcoming: Vec<Level> = self
            .levels
            .iter()
            .filter(|l| l.next_due > today)
            .copied()
            .collect();
        upcoming.sort_by_key(|l| (l.next_due, l.level));

        let actionable = if due.is_empty() {
            None
        } else {
            Some(due.remove(0))
        };

        Classification {
            actionable,
            pending: due,
            upcoming,
        }
    }

    /// Record a review of `number` performed on `on_date`.
    ///
    /// The next due date advances from the level's previous scheduled due
    /// date, not from `on_date`. Completing an overdue level therefore
    /// schedules its next occurrence relative to where it should have
    /// been, so working through a backlog does not shift the cadence
    /// forward by the number of days missed.
    pub fn complete(&mut self, number: u8, on_date: CalendarDate, now_ms: i64) -> Result<()> {
        let interval = self
            .interval_for(number)
            .ok_or(CoreError::LevelNotFound(number))?;
        let level = self
            .level_mut(number)
            .ok_or(CoreError::LevelNotFound(number))?;

        let original_due = level.next_due;
        level.last_completed = Some(on_date);
        level.next_due = original_due.add_days(i64::from(interval));

        self.log.push(LogEntry {
            date: on_date,
            level: number,
            ts: now_ms,
            action: LogAction::Done,
            original_due,
        });
        Ok(())
    }

    /// Revert the most recent completion of `number` on `on_date`.
    ///
    /// Restores the due date stored in the log entry (exact inverse, no
    /// recomputation), clears the completion hint, and removes exactly
    /// that entry. Fails with [`CoreError::NothingToUndo`] when no
    /// matching entry exists.
    pub fn undo(&mut self, number: u8, on_date: CalendarDate) -> Result<LogEntry> {
        if self.level(number).is_none() {
            return Err(CoreError::LevelNotFound(number));
        }

        // Linear scan is fine at this scale: seven levels, one entry per
        // review.
        let index = self
            .log
            .iter()
            .enumerate()
            .filter(|(_, e)| e.level == number && e.date == on_date && e.action == LogAction::Done)
            .max_by_key(|(_, e)| e.ts)
            .map(|(i, _)| i)
            .ok_or(CoreError::NothingToUndo {
                level: number,
                date: on_date,
            })?;

        let entry = self.log.remove(index);
        let level = self
            .level_mut(number)
            .ok_or(CoreError::LevelNotFound(number))?;
        level.next_due = entry.original_due;
        level.last_completed = None;
        Ok(entry)
    }

    /// Distinct due dates strictly before `today`, oldest first.
    pub fn backlog_dates(&self, today: CalendarDate) -> Vec<CalendarDate> {
        let mut dates: Vec<CalendarDate> = self
            .levels
            .iter()
            .map(|l| l.next_due)
            .filter(|d| *d < today)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// Levels whose `next_due` is exactly `date`, by level number.
    pub fn due_on(&self, date: CalendarDate) -> Vec<Level> {
        let mut due: Vec<Level> = self
            .levels
            .iter()
            .filter(|l| l.next_due == date)
            .copied()
            .collect();
        due.sort_by_key(|l| l.level);
        due
    }

    /// One-based day counter since the schedule started, as shown in the
    /// status header. `None` in welcome mode.
    pub fn day_number(&self, today: CalendarDate) -> Option<i64> {
        self.settings
            .start_date
            .map(|start| start.diff_days(today) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_INTERVALS;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn state() -> ScheduleState {
        ScheduleState::initialize(d("2024-01-01"))
    }

    #[test]
    fn classify_covers_all_levels_exactly_once() {
        let s = state();
        let c = s.classify(d("2024-01-05"));
        let mut numbers: Vec<u8> = c
            .actionable
            .iter()
            .chain(c.pending.iter())
            .chain(c.upcoming.iter())
            .map(|l| l.level)
            .collect();
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn actionable_is_oldest_due_level() {
        // Levels 1 (due 01-01), 2 (due 01-02) and 3 (due 01-04) are all
        // overdue on 01-05; the oldest due date wins.
        let s = state();
        let c = s.classify(d("2024-01-05"));
        assert_eq!(c.actionable.unwrap().level, 1);
        let pending: Vec<u8> = c.pending.iter().map(|l| l.level).collect();
        assert_eq!(pending, vec![2, 3]);
        assert_eq!(c.upcoming.first().unwrap().level, 4);
    }

    #[test]
    fn actionable_ties_break_by_level_number() {
        let mut s = state();
        s.level_mut(3).unwrap().next_due = d("2024-01-01");
        let c = s.classify(d("2024-01-02"));
        assert_eq!(c.actionable.unwrap().level, 1);
    }

    #[test]
    fn nothing_actionable_before_start() {
        let s = state();
        let c = s.classify(d("2023-12-31"));
        assert!(c.actionable.is_none());
        assert!(c.pending.is_empty());
        assert_eq!(c.upcoming.len(), 7);
    }

    #[test]
    fn upcoming_is_ordered_by_due_date() {
        let s = state();
        let c = s.classify(d("2024-01-01"));
        let dues: Vec<CalendarDate> = c.upcoming.iter().map(|l| l.next_due).collect();
        let mut sorted = dues.clone();
        sorted.sort_unstable();
        assert_eq!(dues, sorted);
    }

    #[test]
    fn complete_advances_from_previous_due_date() {
        // Level 3 due 2024-01-04, completed four days late on 01-08: the
        // next due date is still 01-04 + 4 days, independent of the delay.
        let mut s = state();
        s.complete(3, d("2024-01-08"), 1).unwrap();
        let level = s.level(3).unwrap();
        assert_eq!(level.next_due, d("2024-01-04").add_days(DEFAULT_INTERVALS[2] as i64));
        assert_eq!(level.next_due, d("2024-01-08"));
        assert_eq!(level.last_completed, Some(d("2024-01-08")));
    }

    #[test]
    fn complete_appends_log_entry_with_original_due() {
        let mut s = state();
        s.complete(1, d("2024-01-01"), 99).unwrap();
        assert_eq!(s.log.len(), 1);
        let entry = &s.log[0];
        assert_eq!(entry.level, 1);
        assert_eq!(entry.date, d("2024-01-01"));
        assert_eq!(entry.ts, 99);
        assert_eq!(entry.original_due, d("2024-01-01"));
        assert_eq!(entry.action, LogAction::Done);
    }

    #[test]
    fn complete_unknown_level_fails() {
        let mut s = state();
        assert!(matches!(
            s.complete(8, d("2024-01-01"), 1),
            Err(CoreError::LevelNotFound(8))
        ));
        assert!(s.log.is_empty());
    }

    #[test]
    fn complete_then_undo_restores_level_and_log() {
        let mut s = state();
        let before = *s.level(2).unwrap();
        s.complete(2, d("2024-01-02"), 7).unwrap();
        s.undo(2, d("2024-01-02")).unwrap();
        assert_eq!(*s.level(2).unwrap(), before);
        assert!(s.log.is_empty());
    }

    #[test]
    fn undo_without_matching_entry_fails() {
        let mut s = state();
        let err = s.undo(2, d("2024-01-02")).unwrap_err();
        assert!(matches!(err, CoreError::NothingToUndo { level: 2, .. }));
    }

    #[test]
    fn undo_removes_most_recent_matching_entry_by_ts() {
        let mut s = state();
        s.complete(1, d("2024-01-01"), 100).unwrap();
        // Same level and date completed again after an undo elsewhere left
        // an older entry behind; only the ts-max one is removed.
        s.complete(1, d("2024-01-01"), 200).unwrap();
        let removed = s.undo(1, d("2024-01-01")).unwrap();
        assert_eq!(removed.ts, 200);
        assert_eq!(s.log.len(), 1);
        assert_eq!(s.log[0].ts, 100);
    }

    #[test]
    fn backlog_dates_are_sorted_and_exclude_today() {
        let s = state();
        let dates = s.backlog_dates(d("2024-01-05"));
        assert_eq!(dates, vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-04")]);
        assert_eq!(s.backlog_dates(d("2024-01-01")), vec![]);
    }

    #[test]
    fn backlog_dates_are_distinct() {
        let mut s = state();
        s.level_mut(2).unwrap().next_due = d("2024-01-01");
        let dates = s.backlog_dates(d("2024-01-05"));
        assert_eq!(dates, vec![d("2024-01-01"), d("2024-01-04")]);
    }

    #[test]
    fn due_on_lists_levels_for_exact_date() {
        let mut s = state();
        s.level_mut(5).unwrap().next_due = d("2024-01-01");
        let due = s.due_on(d("2024-01-01"));
        let numbers: Vec<u8> = due.iter().map(|l| l.level).collect();
        assert_eq!(numbers, vec![1, 5]);
    }

    #[test]
    fn day_number_counts_from_one() {
        let s = state();
        assert_eq!(s.day_number(d("2024-01-01")), Some(1));
        assert_eq!(s.day_number(d("2024-01-05")), Some(5));
        assert_eq!(ScheduleState::welcome().day_number(d("2024-01-01")), None);
    }
}
