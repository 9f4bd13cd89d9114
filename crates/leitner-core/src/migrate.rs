//! Versioned migration and validation of persisted schedule blobs.
//!
//! A raw decoded blob goes through two stages, strictly in order:
//! [`migrate`] upgrades older schema versions to [`CURRENT_VERSION`], then
//! [`validate`] checks the result against the current schema and produces
//! a typed [`ScheduleState`]. Validation fails closed; a blob that does
//! not conform is rejected whole, and the caller treats that the same as
//! having no stored state at all.
//!
//! Migration steps are monotonic and idempotent at the per-step level:
//! re-applying a completed step is a no-op, so a blob that was partially
//! upgraded by an interrupted run is safe to migrate again.

use serde_json::Value;

use crate::date::CalendarDate;
use crate::error::ValidationError;
use crate::model::{
    Level, LogAction, LogEntry, ScheduleState, Settings, Theme, CURRENT_VERSION, LEVEL_COUNT,
};

/// Upgrade a raw blob to the current schema version.
///
/// A missing `settings.version` is treated as version 1.
pub fn migrate(mut raw: Value) -> Value {
    let version = raw
        .pointer("/settings/version")
        .and_then(Value::as_u64)
        .unwrap_or(1);

    if version < 2 {
        migrate_v2(&mut raw);
    }
    if version < 3 {
        migrate_v3(&mut raw);
    }
    raw
}

/// Convenience for the load and import paths: migrate, then validate.
pub fn migrate_and_validate(raw: Value) -> Result<ScheduleState, ValidationError> {
    let migrated = migrate(raw);
    validate(&migrated)
}

fn set_version(raw: &mut Value, version: u64) {
    if let Some(settings) = raw.get_mut("settings").and_then(Value::as_object_mut) {
        settings.insert("version".to_string(), Value::from(version));
    }
}

/// v1 -> v2: backfill `originalDue` on log entries.
///
/// Version 1 never recorded the due date a completion replaced, so the
/// entry's own `date` is the best available approximation. Entries that
/// already carry `originalDue` are left untouched.
fn migrate_v2(raw: &mut Value) {
    if let Some(log) = raw.get_mut("log").and_then(Value::as_array_mut) {
        for entry in log.iter_mut() {
            let Some(obj) = entry.as_object_mut() else {
                continue;
            };
            if !obj.contains_key("originalDue") {
                if let Some(date) = obj.get("date").cloned() {
                    obj.insert("originalDue".to_string(), date);
                }
            }
        }
    }
    set_version(raw, 2);
}

/// v2 -> v3: version bump only.
///
/// Version 3 changed how `nextDue` advances on completion (from the
/// previous scheduled due date instead of the completion date). Due dates
/// already stored under the old rule are accepted as-is: the information
/// needed to recompute them is not in the blob.
fn migrate_v3(raw: &mut Value) {
    set_version(raw, 3);
}

// ── Validation ───────────────────────────────────────────────────────

/// Check a migrated blob against the current schema.
///
/// Structural and type checks only; no repair. Any deviation fails the
/// whole blob with a [`ValidationError`].
pub fn validate(value: &Value) -> Result<ScheduleState, ValidationError> {
    let root = as_object(value, "$")?;

    let settings = validate_settings(require(root, "settings", "$")?)?;
    let levels = validate_levels(require(root, "levels", "$")?)?;
    let log = validate_log(require(root, "log", "$")?)?;

    Ok(ScheduleState {
        settings,
        levels,
        log,
    })
}

fn validate_settings(value: &Value) -> Result<Settings, ValidationError> {
    let path = "$.settings";
    let obj = as_object(value, path)?;

    // A persisted blob is always an initialized schedule; welcome mode is
    // represented by the absence of a blob, never by startDate: null.
    let start_date = date_field(obj, "startDate", path)?;

    let intervals_value = require(obj, "intervals", path)?;
    let intervals_array = intervals_value
        .as_array()
        .ok_or_else(|| invalid("$.settings.intervals", "expected an array"))?;
    if intervals_array.len() != LEVEL_COUNT {
        return Err(invalid(
            "$.settings.intervals",
            &format!("expected {LEVEL_COUNT} entries, found {}", intervals_array.len()),
        ));
    }
    let mut intervals = [0u32; LEVEL_COUNT];
    for (i, entry) in intervals_array.iter().enumerate() {
        let days = entry
            .as_u64()
            .filter(|n| *n >= 1)
            .ok_or_else(|| invalid("$.settings.intervals", "entries must be positive integers"))?;
        intervals[i] = u32::try_from(days)
            .map_err(|_| invalid("$.settings.intervals", "interval out of range"))?;
    }

    let theme_str = require(obj, "theme", path)?
        .as_str()
        .ok_or_else(|| invalid("$.settings.theme", "expected a string"))?;
    let theme = Theme::parse(theme_str)
        .ok_or_else(|| invalid("$.settings.theme", "expected system, light, or dark"))?;

    let version = require(obj, "version", path)?
        .as_u64()
        .ok_or_else(|| invalid("$.settings.version", "expected an integer"))?;
    if version != u64::from(CURRENT_VERSION) {
        return Err(invalid(
            "$.settings.version",
            &format!("expected {CURRENT_VERSION}, found {version} (was migrate skipped?)"),
        ));
    }

    Ok(Settings {
        start_date: Some(start_date),
        intervals,
        theme,
        version: CURRENT_VERSION,
    })
}

fn validate_levels(value: &Value) -> Result<Vec<Level>, ValidationError> {
    let array = value
        .as_array()
        .ok_or_else(|| invalid("$.levels", "expected an array"))?;
    if array.len() != LEVEL_COUNT {
        return Err(ValidationError::LevelCount {
            expected: LEVEL_COUNT,
            found: array.len(),
        });
    }

    let mut levels = Vec::with_capacity(LEVEL_COUNT);
    for (i, entry) in array.iter().enumerate() {
        let path = format!("$.levels[{i}]");
        let obj = as_object(entry, &path)?;
        let number = level_number_field(obj, "level", &path)?;
        let next_due = date_field(obj, "nextDue", &path)?;
        let last_completed = nullable_date_field(obj, "lastCompleted", &path)?;
        levels.push(Level {
            level: number,
            next_due,
            last_completed,
        });
    }

    // Exactly one record per level 1..=7: no duplicates, no gaps.
    let mut numbers: Vec<u8> = levels.iter().map(|l| l.level).collect();
    numbers.sort_unstable();
    if numbers != (1..=LEVEL_COUNT as u8).collect::<Vec<u8>>() {
        return Err(ValidationError::LevelNumbers);
    }

    levels.sort_by_key(|l| l.level);
    Ok(levels)
}

fn validate_log(value: &Value) -> Result<Vec<LogEntry>, ValidationError> {
    let array = value
        .as_array()
        .ok_or_else(|| invalid("$.log", "expected an array"))?;

    let mut log = Vec::with_capacity(array.len());
    for (i, entry) in array.iter().enumerate() {
        let path = format!("$.log[{i}]");
        let obj = as_object(entry, &path)?;

        let date = date_field(obj, "date", &path)?;
        let level = level_number_field(obj, "level", &path)?;
        let ts = require(obj, "ts", &path)?
            .as_i64()
            .ok_or_else(|| invalid(&format!("{path}.ts"), "expected an integer"))?;
        let action = require(obj, "action", &path)?
            .as_str()
            .ok_or_else(|| invalid(&format!("{path}.action"), "expected a string"))?;
        if action != "done" {
            return Err(invalid(&format!("{path}.action"), "expected \"done\""));
        }
        let original_due = date_field(obj, "originalDue", &path)?;

        log.push(LogEntry {
            date,
            level,
            ts,
            action: LogAction::Done,
            original_due,
        });
    }
    Ok(log)
}

// ── Field helpers ────────────────────────────────────────────────────

fn invalid(field: &str, message: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn as_object<'a>(
    value: &'a Value,
    path: &str,
) -> Result<&'a serde_json::Map<String, Value>, ValidationError> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::NotAnObject(path.to_string()))
}

fn require<'a>(
    obj: &'a serde_json::Map<String, Value>,
    name: &str,
    path: &str,
) -> Result<&'a Value, ValidationError> {
    obj.get(name)
        .ok_or_else(|| ValidationError::MissingField(format!("{path}.{name}")))
}

fn date_field(
    obj: &serde_json::Map<String, Value>,
    name: &str,
    path: &str,
) -> Result<CalendarDate, ValidationError> {
    let field = format!("{path}.{name}");
    let s = require(obj, name, path)?
        .as_str()
        .ok_or_else(|| invalid(&field, "expected a YYYY-MM-DD string"))?;
    s.parse()
        .map_err(|_| invalid(&field, "expected a YYYY-MM-DD string"))
}

fn nullable_date_field(
    obj: &serde_json::Map<String, Value>,
    name: &str,
    path: &str,
) -> Result<Option<CalendarDate>, ValidationError> {
    let field = format!("{path}.{name}");
    match require(obj, name, path)? {
        Value::Null => Ok(None),
        Value::String(s) => s
            .parse()
            .map(Some)
            .map_err(|_| invalid(&field, "expected a YYYY-MM-DD string or null")),
        _ => Err(invalid(&field, "expected a YYYY-MM-DD string or null")),
    }
}

fn level_number_field(
    obj: &serde_json::Map<String, Value>,
    name: &str,
    path: &str,
) -> Result<u8, ValidationError> {
    let field = format!("{path}.{name}");
    let n = require(obj, name, path)?
        .as_u64()
        .filter(|n| (1..=LEVEL_COUNT as u64).contains(n))
        .ok_or_else(|| invalid(&field, "expected an integer in 1..=7"))?;
    Ok(n as u8)
}
