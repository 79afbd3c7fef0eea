//! Attendance record model.
//!
//! # Responsibility
//! - Define the durable fact that a student was present for a period on a
//!   given date.
//!
//! # Invariants
//! - At most one record exists per `(usn, period_subject, date)`; the
//!   storage layer enforces this with a unique index.
//! - `date` is always the calendar date of `recognized_at` in the same
//!   wall-clock frame, never a timezone-shifted value.
//! - Records are created once and never mutated.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an attendance record.
pub type RecordId = Uuid;

/// Durable presence fact produced by the attendance recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Stable row identity.
    pub id: RecordId,
    /// Normalized student USN.
    pub usn: String,
    /// Subject label of the period the recognition fell into.
    pub period_subject: String,
    /// Wall-clock moment of the recognition event, as captured.
    pub recognized_at: NaiveDateTime,
    /// Calendar date component of `recognized_at`; part of the dedup key.
    pub date: NaiveDate,
}

impl AttendanceRecord {
    /// Creates a record with a generated ID, deriving `date` from the
    /// recognition timestamp.
    pub fn new(
        usn: impl Into<String>,
        period_subject: impl Into<String>,
        recognized_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            usn: usn.into(),
            period_subject: period_subject.into(),
            recognized_at,
            date: recognized_at.date(),
        }
    }
}
