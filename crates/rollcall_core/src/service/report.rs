//! CSV attendance reports.
//!
//! # Responsibility
//! - Render detailed (log dump) and summary (per-student percentage)
//!   reports for a subject over a date range.
//!
//! # Invariants
//! - Sessions held = number of distinct dates with at least one record for
//!   the subject in range; absent students contribute no rows, so absence
//!   is derived, never stored.
//! - Every CSV field is quoted; embedded quotes are doubled.

use crate::model::period::Weekday;
use crate::repo::attendance_repo::{AttendanceRepository, RecordListQuery};
use crate::repo::student_repo::StudentRepository;
use crate::repo::RepoResult;
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

/// Subject and date-range scope for a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub subject: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Use-case service rendering attendance CSV reports.
pub struct ReportService<S, A> {
    students: S,
    records: A,
}

impl<S, A> ReportService<S, A>
where
    S: StudentRepository,
    A: AttendanceRepository,
{
    pub fn new(students: S, records: A) -> Self {
        Self { students, records }
    }

    /// Newest-first log dump: one CSV row per attendance record.
    pub fn detailed_csv(&self, query: &ReportQuery) -> RepoResult<String> {
        let records = self.records.list_records(&scope_to_list_query(query))?;

        let mut lines = vec![csv_line(&["Date", "Day", "Time", "Subject", "Name", "USN"])];
        for record in records {
            let name = self
                .students
                .find_by_usn(&record.usn)?
                .map_or_else(|| "Unknown".to_string(), |student| student.name);
            let day = Weekday::from(record.date.weekday());
            lines.push(csv_line(&[
                &record.date.format("%Y-%m-%d").to_string(),
                day.as_str(),
                &record.recognized_at.format("%H:%M:%S").to_string(),
                &record.period_subject,
                &name,
                &record.usn,
            ]));
        }

        Ok(lines.join("\n"))
    }

    /// Per-student summary: sessions held, attended, missed, percentage.
    ///
    /// Covers the whole roster, so students with zero records still appear
    /// with 0% instead of silently dropping out.
    pub fn summary_csv(&self, query: &ReportQuery) -> RepoResult<String> {
        let records = self.records.list_records(&scope_to_list_query(query))?;

        let session_dates: HashSet<NaiveDate> =
            records.iter().map(|record| record.date).collect();
        let sessions_held = session_dates.len();

        let mut lines = vec![csv_line(&[
            "Name",
            "USN",
            "Subject",
            "Sessions Held",
            "Attended",
            "Missed",
            "Percentage",
        ])];

        for student in self.students.list_students()? {
            let attended = records
                .iter()
                .filter(|record| record.usn == student.usn)
                .count();
            let missed = sessions_held.saturating_sub(attended);
            let percentage = if sessions_held == 0 {
                0
            } else {
                (attended * 100 + sessions_held / 2) / sessions_held
            };

            lines.push(csv_line(&[
                &student.name,
                &student.usn,
                &query.subject,
                &sessions_held.to_string(),
                &attended.to_string(),
                &missed.to_string(),
                &format!("{percentage}%"),
            ]));
        }

        Ok(lines.join("\n"))
    }
}

fn scope_to_list_query(query: &ReportQuery) -> RecordListQuery {
    RecordListQuery {
        subject: Some(query.subject.clone()),
        from: query.from,
        to: query.to,
        ..RecordListQuery::default()
    }
}

fn csv_line(fields: &[&str]) -> String {
    let quoted: Vec<String> = fields
        .iter()
        .map(|field| format!("\"{}\"", field.replace('"', "\"\"")))
        .collect();
    quoted.join(",")
}
