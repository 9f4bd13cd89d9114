pub mod data;
pub mod review;
pub mod schedule;
pub mod theme;

use leitner_core::{CalendarDate, FileStore, SchedulePersistence, ScheduleState};

pub(crate) type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the default file-backed persistence.
pub(crate) fn persistence() -> Result<SchedulePersistence<FileStore>, Box<dyn std::error::Error>> {
    Ok(SchedulePersistence::new(FileStore::open_default()?))
}

/// Load the stored schedule or fail with a hint to initialize one.
pub(crate) fn load_required(
    persistence: &SchedulePersistence<FileStore>,
) -> Result<ScheduleState, Box<dyn std::error::Error>> {
    persistence
        .load()?
        .ok_or_else(|| "no schedule yet; run `leitner schedule init` first".into())
}

/// Parse an optional --date argument, defaulting to today.
pub(crate) fn date_or_today(
    date: Option<String>,
    today: CalendarDate,
) -> Result<CalendarDate, Box<dyn std::error::Error>> {
    match date {
        Some(s) => Ok(s.parse::<CalendarDate>()?),
        None => Ok(today),
    }
}
