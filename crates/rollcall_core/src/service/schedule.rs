//! Schedule resolution and timetable use-cases.
//!
//! # Responsibility
//! - Map a wall-clock moment to the currently active period, if any.
//! - Provide the timetable write/read surface for admin callers.
//!
//! # Invariants
//! - Resolution is pure: same periods + same timestamp always give the
//!   same answer.
//! - A period matches on the half-open interval `[start, end)`; a query
//!   exactly at `end` does not match.
//! - On (externally written) overlapping schedules the first period in
//!   the given order wins; schedules written through `add_period` cannot
//!   overlap in the first place.

use crate::model::period::{Period, PeriodId, Weekday};
use crate::repo::schedule_repo::ScheduleRepository;
use crate::repo::RepoResult;
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Returns the first period in `periods` whose day matches `at` and whose
/// `[start, end)` minute interval contains the time-of-day of `at`.
pub fn resolve_active_period(periods: &[Period], at: NaiveDateTime) -> Option<&Period> {
    let day = Weekday::from(at.weekday());
    let minute = (at.hour() * 60 + at.minute()) as u16;

    periods
        .iter()
        .find(|period| period.day == day && period.contains_minute(minute))
}

/// Request model for adding a timetable period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPeriodRequest {
    pub subject: String,
    pub day: Weekday,
    /// Wall-clock `HH:MM`, inclusive boundary.
    pub start_time: String,
    /// Wall-clock `HH:MM`, exclusive boundary.
    pub end_time: String,
}

/// Use-case service wrapper for timetable operations.
pub struct ScheduleService<R: ScheduleRepository> {
    repo: R,
}

impl<R: ScheduleRepository> ScheduleService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and persists a new period.
    ///
    /// Returns `RepoError::ScheduleOverlap` when the slot intersects an
    /// existing same-day period.
    pub fn add_period(&self, request: &AddPeriodRequest) -> RepoResult<Period> {
        let period = Period::from_times(
            request.subject.clone(),
            request.day,
            &request.start_time,
            &request.end_time,
        )?;
        self.repo.create_period(&period)?;
        Ok(period)
    }

    /// Lists the full weekly timetable.
    pub fn list_periods(&self) -> RepoResult<Vec<Period>> {
        self.repo.list_periods()
    }

    /// Removes a period by ID.
    pub fn remove_period(&self, id: PeriodId) -> RepoResult<()> {
        self.repo.delete_period(id)
    }

    /// Resolves the active period for a wall-clock moment against the
    /// stored timetable.
    pub fn resolve_at(&self, at: NaiveDateTime) -> RepoResult<Option<Period>> {
        let periods = self.repo.list_periods_for_day(Weekday::from(at.weekday()))?;
        Ok(resolve_active_period(&periods, at).cloned())
    }
}
