//! Core domain logic for Rollcall, a face-recognition attendance tracker.
//! This crate is the single source of truth for business invariants.
//!
//! The two operations everything else hangs off are
//! [`resolve_active_period`] (timestamp -> active timetable period) and
//! [`AttendanceService::record_attendance`] (recognition event -> at most
//! one accepted record per student per period per day).

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::period::{Period, PeriodId, PeriodValidationError, Weekday};
pub use model::record::{AttendanceRecord, RecordId};
pub use model::student::{Student, StudentId, StudentValidationError};
pub use repo::attendance_repo::{
    AttendanceRepository, RecordListQuery, SqliteAttendanceRepository,
};
pub use repo::schedule_repo::{ScheduleRepository, SqliteScheduleRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::attendance::{AttendanceError, AttendanceService, RecordOutcome};
pub use service::report::{ReportQuery, ReportService};
pub use service::schedule::{resolve_active_period, AddPeriodRequest, ScheduleService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
