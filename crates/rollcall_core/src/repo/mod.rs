//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for roster, timetable
//!   and attendance storage.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must call the model `validate()` before SQL
//!   mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Unique-key violations surface as `RepoError::Conflict`, never as raw
//!   driver errors, so callers can treat them as idempotence signals.

use crate::db::DbError;
use crate::model::period::{PeriodValidationError, Weekday};
use crate::model::student::StudentValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod attendance_repo;
pub mod schedule_repo;
pub mod student_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Period(PeriodValidationError),
    Student(StudentValidationError),
    Db(DbError),
    /// Target row does not exist; carries a human-readable key.
    NotFound(String),
    /// A unique index rejected the write; an equivalent row already exists.
    Conflict,
    /// A new period intersects an existing one on the same day.
    ScheduleOverlap { subject: String, day: Weekday },
    /// Persisted state failed to parse back into the domain model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Period(err) => write!(f, "{err}"),
            Self::Student(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "not found: {key}"),
            Self::Conflict => write!(f, "row already exists for this unique key"),
            Self::ScheduleOverlap { subject, day } => {
                write!(f, "period overlaps existing `{subject}` on {day}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Period(err) => Some(err),
            Self::Student(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PeriodValidationError> for RepoError {
    fn from(value: PeriodValidationError) -> Self {
        Self::Period(value)
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Student(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// True when a driver error is a unique/primary-key constraint violation.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(ffi_err, _)
            if ffi_err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
