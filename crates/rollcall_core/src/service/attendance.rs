//! Attendance recorder use-case.
//!
//! # Responsibility
//! - Turn a recognition event (USN + timestamp) into an at-most-once
//!   attendance write against the active period.
//!
//! # Invariants
//! - Student existence is checked before the schedule is consulted;
//!   unknown identities never touch the timetable or record store.
//! - Exactly zero or one record rows are written per invocation.
//! - A store-level `Conflict` from a racing insert is folded into
//!   `AlreadyRecorded`, never surfaced as an error. The unique index on
//!   `(usn, period_subject, date)` is the serialization point; no lock is
//!   taken around the check-and-insert sequence.

use crate::model::record::AttendanceRecord;
use crate::model::student::normalize_usn;
use crate::repo::attendance_repo::AttendanceRepository;
use crate::repo::schedule_repo::ScheduleRepository;
use crate::repo::student_repo::StudentRepository;
use crate::repo::RepoError;
use crate::service::schedule::resolve_active_period;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Successful outcome of a recording attempt.
///
/// `AlreadyRecorded` is the steady-state result of the kiosk polling loop
/// re-recognizing a present student; callers must treat it as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new record row was written.
    Recorded(AttendanceRecord),
    /// A record for this key already existed; nothing was written.
    AlreadyRecorded {
        usn: String,
        period_subject: String,
        date: NaiveDate,
    },
}

impl RecordOutcome {
    /// True when this invocation wrote a new row.
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }

    /// Subject label the attempt resolved to.
    pub fn period_subject(&self) -> &str {
        match self {
            Self::Recorded(record) => &record.period_subject,
            Self::AlreadyRecorded { period_subject, .. } => period_subject,
        }
    }
}

/// Failure of a recording attempt. All variants are per-call input or
/// storage conditions; none are fatal to the process.
#[derive(Debug)]
pub enum AttendanceError {
    /// The USN is not on the roster. The schedule was never consulted.
    UnknownStudent(String),
    /// No timetable period covers the recognition moment.
    NoActivePeriod { at: NaiveDateTime },
    /// Storage failure other than the dedup conflict.
    Repo(RepoError),
}

impl Display for AttendanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStudent(usn) => write!(f, "student not found: {usn}"),
            Self::NoActivePeriod { at } => write!(
                f,
                "no active period at {}",
                at.format("%Y-%m-%d %H:%M:%S")
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttendanceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AttendanceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service for the attendance recorder.
///
/// Generic over its three store contracts so tests can substitute
/// in-memory or probing implementations per dependency.
pub struct AttendanceService<S, C, A> {
    students: S,
    schedule: C,
    records: A,
}

impl<S, C, A> AttendanceService<S, C, A>
where
    S: StudentRepository,
    C: ScheduleRepository,
    A: AttendanceRepository,
{
    /// Creates a service over the provided store implementations.
    pub fn new(students: S, schedule: C, records: A) -> Self {
        Self {
            students,
            schedule,
            records,
        }
    }

    /// Records attendance for a recognition event.
    ///
    /// # Contract
    /// - Unknown USN -> `AttendanceError::UnknownStudent`, nothing written.
    /// - No period covering `recognized_at` -> `AttendanceError::NoActivePeriod`,
    ///   nothing written.
    /// - First event for `(usn, period, date)` -> `RecordOutcome::Recorded`.
    /// - Any later event for the same key -> `RecordOutcome::AlreadyRecorded`,
    ///   including when a concurrent call wins the insert race.
    pub fn record_attendance(
        &self,
        usn: &str,
        recognized_at: NaiveDateTime,
    ) -> Result<RecordOutcome, AttendanceError> {
        let usn = normalize_usn(usn);

        let student = self
            .students
            .find_by_usn(&usn)?
            .ok_or_else(|| AttendanceError::UnknownStudent(usn.clone()))?;

        let periods = self
            .schedule
            .list_periods_for_day(recognized_at.weekday().into())?;
        let period = resolve_active_period(&periods, recognized_at)
            .ok_or(AttendanceError::NoActivePeriod { at: recognized_at })?;

        let date = recognized_at.date();

        if self
            .records
            .find_record(&student.usn, &period.subject, date)?
            .is_some()
        {
            info!(
                "event=attendance_duplicate module=attendance status=ok usn={} subject={} date={date}",
                student.usn, period.subject
            );
            return Ok(RecordOutcome::AlreadyRecorded {
                usn: student.usn,
                period_subject: period.subject.clone(),
                date,
            });
        }

        let record = AttendanceRecord::new(&student.usn, &period.subject, recognized_at);
        match self.records.insert_record(&record) {
            Ok(_) => {
                info!(
                    "event=attendance_recorded module=attendance status=ok usn={} subject={} date={date}",
                    record.usn, record.period_subject
                );
                Ok(RecordOutcome::Recorded(record))
            }
            // A concurrent call inserted between our lookup and insert; the
            // unique index already holds the row, so the outcome is the same.
            Err(RepoError::Conflict) => {
                info!(
                    "event=attendance_duplicate module=attendance status=ok usn={} subject={} date={date} race=lost",
                    student.usn, period.subject
                );
                Ok(RecordOutcome::AlreadyRecorded {
                    usn: student.usn,
                    period_subject: period.subject.clone(),
                    date,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}
