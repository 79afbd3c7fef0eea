//! Timetable repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Store weekly periods and serve the per-day slices the resolver scans.
//! - Reject overlapping same-day periods at write time, keeping the
//!   resolver's first-match scan unambiguous.
//!
//! # Invariants
//! - Period boundaries persist as `HH:MM` text; read paths reject rows
//!   that no longer parse.
//! - `list_periods_for_day` preserves insertion order; the resolver's
//!   first-match semantics depend on no hidden re-sorting here.

use crate::model::period::{parse_hhmm, Period, PeriodId, Weekday};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const PERIOD_SELECT_SQL: &str = "SELECT uuid, subject, day, start_time, end_time FROM periods";

/// Repository interface for timetable access.
pub trait ScheduleRepository {
    fn create_period(&self, period: &Period) -> RepoResult<PeriodId>;
    fn list_periods(&self) -> RepoResult<Vec<Period>>;
    fn list_periods_for_day(&self, day: Weekday) -> RepoResult<Vec<Period>>;
    fn delete_period(&self, id: PeriodId) -> RepoResult<()>;
}

/// SQLite-backed timetable repository.
pub struct SqliteScheduleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteScheduleRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ScheduleRepository for SqliteScheduleRepository<'_> {
    fn create_period(&self, period: &Period) -> RepoResult<PeriodId> {
        period.validate()?;

        // Admin-path check; timetable edits are rare and not raced by the
        // recognition loop, so a read-before-insert is acceptable here.
        for existing in self.list_periods_for_day(period.day)? {
            if existing.overlaps(period) {
                return Err(RepoError::ScheduleOverlap {
                    subject: existing.subject,
                    day: period.day,
                });
            }
        }

        self.conn.execute(
            "INSERT INTO periods (uuid, subject, day, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                period.id.to_string(),
                period.subject.as_str(),
                period.day.as_str(),
                period.start_time(),
                period.end_time(),
            ],
        )?;

        Ok(period.id)
    }

    fn list_periods(&self) -> RepoResult<Vec<Period>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERIOD_SELECT_SQL} ORDER BY day, start_time;"))?;
        let periods = collect_periods(&mut stmt.query([])?);
        periods
    }

    fn list_periods_for_day(&self, day: Weekday) -> RepoResult<Vec<Period>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERIOD_SELECT_SQL} WHERE day = ?1;"))?;
        let periods = collect_periods(&mut stmt.query(params![day.as_str()])?);
        periods
    }

    fn delete_period(&self, id: PeriodId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM periods WHERE uuid = ?1;", params![id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(format!("period {id}")));
        }

        Ok(())
    }
}

fn collect_periods(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Period>> {
    let mut periods = Vec::new();
    while let Some(row) = rows.next()? {
        periods.push(parse_period_row(row)?);
    }
    Ok(periods)
}

fn parse_period_row(row: &Row<'_>) -> RepoResult<Period> {
    let raw_uuid: String = row.get(0)?;
    let id = Uuid::parse_str(&raw_uuid)
        .map_err(|err| RepoError::InvalidData(format!("period uuid `{raw_uuid}`: {err}")))?;

    let raw_day: String = row.get(2)?;
    let day = raw_day
        .parse::<Weekday>()
        .map_err(|err| RepoError::InvalidData(format!("period day: {err}")))?;

    let raw_start: String = row.get(3)?;
    let raw_end: String = row.get(4)?;
    let start_minute = parse_hhmm(&raw_start)
        .map_err(|err| RepoError::InvalidData(format!("period start_time: {err}")))?;
    let end_minute = parse_hhmm(&raw_end)
        .map_err(|err| RepoError::InvalidData(format!("period end_time: {err}")))?;

    Ok(Period {
        id,
        subject: row.get(1)?,
        day,
        start_minute,
        end_minute,
    })
}
