//! Core error types for leitner-core.
//!
//! Every engine failure is surfaced as an explicit result using thiserror;
//! nothing here panics or retries. User-facing messaging is decided by the
//! caller (the CLI).

use thiserror::Error;

use crate::date::CalendarDate;

/// Malformed calendar date input.
///
/// Fatal to the single operation that received the string, not to the
/// process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed calendar date '{0}', expected YYYY-MM-DD")]
pub struct FormatError(pub String);

/// Schema conformance failures in a persisted or imported blob.
///
/// Validation fails closed: any deviation rejects the whole blob, and the
/// caller falls back to treating the state as absent. There is no partial
/// recovery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A value that must be a JSON object is not one.
    #[error("expected an object at '{0}'")]
    NotAnObject(String),

    /// A required field is absent.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A field is present but has the wrong type or an out-of-range value.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// The levels array does not hold exactly seven records.
    #[error("expected exactly {expected} levels, found {found}")]
    LevelCount { expected: usize, found: usize },

    /// Level numbers are not exactly 1..=7 with no duplicates.
    #[error("level numbers must cover 1..=7 exactly once")]
    LevelNumbers,
}

/// Core error type for leitner-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed date string
    #[error("date error: {0}")]
    Format(#[from] FormatError),

    /// Blob failed schema conformance after migration
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Operation referenced a level number outside 1..=7.
    ///
    /// Unreachable under the fixed-cardinality invariant; hitting it is a
    /// programming-logic fault in the caller.
    #[error("no level numbered {0}")]
    LevelNotFound(u8),

    /// Undo requested with no matching completion in the log.
    ///
    /// Recoverable: surfaced to the caller as a signal, not a crash.
    #[error("nothing to undo for level {level} on {date}")]
    NothingToUndo { level: u8, date: CalendarDate },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
