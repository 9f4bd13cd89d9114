//! # Leitner Core Library
//!
//! This library provides the scheduling engine for a personal Leitner-box
//! spaced-repetition schedule: seven fixed review levels with geometric
//! intervals, a due-date/backlog classifier, exact complete/undo
//! transitions over an append-only log, and a versioned
//! migration/validation pipeline for the persisted JSON blob.
//!
//! The CLI binary is a thin layer over this crate; rendering, dialogs and
//! theming are presentation concerns that live outside it.
//!
//! ## Architecture
//!
//! - **Calendar arithmetic**: timezone-less `YYYY-MM-DD` dates with all
//!   math in one fixed frame
//! - **State model**: settings, the seven levels, and the action log
//! - **Scheduling engine**: pure in-memory queries and transitions; no I/O
//! - **Migration & validation**: raw blob -> current schema -> typed state,
//!   failing closed
//! - **Persistence**: a single fixed key in a generic byte store
//!
//! ## Key Components
//!
//! - [`CalendarDate`]: date newtype plus the [`Clock`] capability
//! - [`ScheduleState`]: the one live state the engine mutates
//! - [`SchedulePersistence`]: load/save/wipe/import over a [`Store`]

pub mod date;
pub mod engine;
pub mod error;
pub mod migrate;
pub mod model;
pub mod store;

pub use date::{CalendarDate, Clock, FixedClock, SystemClock};
pub use engine::Classification;
pub use error::{CoreError, FormatError, Result, ValidationError};
pub use model::{
    Level, LogAction, LogEntry, ScheduleState, Settings, Theme, CURRENT_VERSION,
    DEFAULT_INTERVALS, LEVEL_COUNT,
};
pub use store::{FileStore, MemoryStore, SchedulePersistence, Store, STORAGE_KEY};
