//! Persistence adapter: one JSON blob under a single fixed key.
//!
//! The engine never touches storage directly; callers load a
//! [`ScheduleState`] through [`SchedulePersistence`], mutate it in memory,
//! and save it back. Loading runs the full migrate -> validate pipeline,
//! and anything that fails it (unreadable bytes, unparsable JSON, schema
//! deviation) is reported as "no state" so the caller falls back to
//! welcome mode instead of partially accepting a blob.
//!
//! The file backend keeps the blob at `~/.config/leitner/<key>.json`.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::date::CalendarDate;
use crate::error::Result;
use crate::migrate;
use crate::model::ScheduleState;

/// The single fixed key the whole schedule lives under.
pub const STORAGE_KEY: &str = "leitner-schedule";

/// Generic key-value blob store.
///
/// Assumed single-writer: one logical user, one active instance. Saves are
/// last-write-wins; no locking discipline beyond that.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<()>;
    fn delete(&mut self, key: &str) -> Result<()>;
}

/// In-memory store, used in tests and anywhere persistence is optional.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Returns `~/.config/leitner[-dev]/` based on LEITNER_ENV.
///
/// Set LEITNER_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LEITNER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("leitner-dev")
    } else {
        base_dir.join("leitner")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// File-backed store: each key is one JSON file in a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Open the default store under the user data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(data_dir()?))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        std::fs::write(self.path_for(key), bytes)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serializes the schedule to and from a [`Store`].
#[derive(Debug)]
pub struct SchedulePersistence<S: Store> {
    store: S,
}

impl<S: Store> SchedulePersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the stored schedule, if a valid one exists.
    ///
    /// A present-but-invalid blob (bad JSON, failed migration target,
    /// schema deviation) is treated identically to absence: the caller
    /// gets `None` and starts in welcome mode. The invalid blob is left in
    /// place untouched.
    pub fn load(&self) -> Result<Option<ScheduleState>> {
        let Some(bytes) = self.store.get(STORAGE_KEY)? else {
            return Ok(None);
        };
        let raw: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("warning: stored schedule is not valid JSON: {e}");
                return Ok(None);
            }
        };
        match migrate::migrate_and_validate(raw) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                eprintln!("warning: stored schedule failed validation: {e}");
                Ok(None)
            }
        }
    }

    /// Persist the current in-memory state. Last write wins.
    pub fn save(&mut self, state: &ScheduleState) -> Result<()> {
        let bytes = serde_json::to_vec(state)?;
        self.store.set(STORAGE_KEY, &bytes)
    }

    /// Delete the stored schedule. Irreversible; the log is not preserved.
    pub fn wipe(&mut self) -> Result<()> {
        self.store.delete(STORAGE_KEY)
    }

    /// Accept an exported blob: parse, migrate, validate, then persist.
    ///
    /// On any failure the error is returned and the stored state is left
    /// untouched.
    pub fn import(&mut self, bytes: &[u8]) -> Result<ScheduleState> {
        let raw: serde_json::Value = serde_json::from_slice(bytes)?;
        let state = migrate::migrate_and_validate(raw)?;
        self.save(&state)?;
        Ok(state)
    }
}

/// Pretty-printed JSON for export files.
pub fn export_json(state: &ScheduleState) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Export file name for a given day: `leitner-schedule-export-<today>.json`.
pub fn export_file_name(today: CalendarDate) -> String {
    format!("leitner-schedule-export-{today}.json")
}
