//! Attendance record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist insert-only presence facts and serve the dedup lookup.
//! - Surface unique-index rejections as `Conflict` so the recorder can
//!   fold racing inserts into its idempotent result.
//!
//! # Invariants
//! - The `(usn, period_subject, date)` unique index is authoritative; the
//!   repository never pre-checks it on insert.
//! - `date` and `recognized_at` persist in the same wall-clock frame they
//!   were captured in.

use crate::model::record::{AttendanceRecord, RecordId};
use crate::repo::{is_constraint_violation, RepoError, RepoResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const RECORD_SELECT_SQL: &str =
    "SELECT uuid, usn, period_subject, recognized_at, date FROM attendance_records";

const DATE_FMT: &str = "%Y-%m-%d";
const TIMESTAMP_FMT: &str = "%Y-%m-%dT%H:%M:%S";

/// Filter options for listing attendance records.
#[derive(Debug, Clone, Default)]
pub struct RecordListQuery {
    pub usn: Option<String>,
    pub subject: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
}

/// Repository interface for attendance facts.
pub trait AttendanceRepository {
    fn find_record(
        &self,
        usn: &str,
        subject: &str,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>>;
    fn insert_record(&self, record: &AttendanceRecord) -> RepoResult<RecordId>;
    fn list_records(&self, query: &RecordListQuery) -> RepoResult<Vec<AttendanceRecord>>;
    fn count_present(&self, subject: &str, date: NaiveDate) -> RepoResult<u32>;
}

/// SQLite-backed attendance repository.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn find_record(
        &self,
        usn: &str,
        subject: &str,
        date: NaiveDate,
    ) -> RepoResult<Option<AttendanceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE usn = ?1 AND period_subject = ?2 AND date = ?3;"
        ))?;

        let mut rows = stmt.query(params![usn, subject, date.format(DATE_FMT).to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    fn insert_record(&self, record: &AttendanceRecord) -> RepoResult<RecordId> {
        let result = self.conn.execute(
            "INSERT INTO attendance_records (uuid, usn, period_subject, recognized_at, date)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                record.id.to_string(),
                record.usn.as_str(),
                record.period_subject.as_str(),
                record.recognized_at.format(TIMESTAMP_FMT).to_string(),
                record.date.format(DATE_FMT).to_string(),
            ],
        );

        match result {
            Ok(_) => Ok(record.id),
            Err(err) if is_constraint_violation(&err) => Err(RepoError::Conflict),
            Err(err) => Err(err.into()),
        }
    }

    fn list_records(&self, query: &RecordListQuery) -> RepoResult<Vec<AttendanceRecord>> {
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(usn) = &query.usn {
            bind_values.push(Value::Text(usn.clone()));
            sql.push_str(&format!(" AND usn = ?{}", bind_values.len()));
        }

        if let Some(subject) = &query.subject {
            bind_values.push(Value::Text(subject.clone()));
            sql.push_str(&format!(" AND period_subject = ?{}", bind_values.len()));
        }

        if let Some(from) = query.from {
            bind_values.push(Value::Text(from.format(DATE_FMT).to_string()));
            sql.push_str(&format!(" AND date >= ?{}", bind_values.len()));
        }

        if let Some(to) = query.to {
            bind_values.push(Value::Text(to.format(DATE_FMT).to_string()));
            sql.push_str(&format!(" AND date <= ?{}", bind_values.len()));
        }

        sql.push_str(" ORDER BY recognized_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            bind_values.push(Value::Integer(i64::from(limit)));
            sql.push_str(&format!(" LIMIT ?{}", bind_values.len()));
        }

        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }

    fn count_present(&self, subject: &str, date: NaiveDate) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM attendance_records
             WHERE period_subject = ?1 AND date = ?2;",
            params![subject, date.format(DATE_FMT).to_string()],
            |row| row.get::<_, u32>(0),
        )?;

        Ok(count)
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<AttendanceRecord> {
    let raw_uuid: String = row.get(0)?;
    let id = Uuid::parse_str(&raw_uuid)
        .map_err(|err| RepoError::InvalidData(format!("record uuid `{raw_uuid}`: {err}")))?;

    let raw_timestamp: String = row.get(3)?;
    let recognized_at = NaiveDateTime::parse_from_str(&raw_timestamp, TIMESTAMP_FMT)
        .map_err(|err| {
            RepoError::InvalidData(format!("record recognized_at `{raw_timestamp}`: {err}"))
        })?;

    let raw_date: String = row.get(4)?;
    let date = NaiveDate::parse_from_str(&raw_date, DATE_FMT)
        .map_err(|err| RepoError::InvalidData(format!("record date `{raw_date}`: {err}")))?;

    Ok(AttendanceRecord {
        id,
        usn: row.get(1)?,
        period_subject: row.get(2)?,
        recognized_at,
        date,
    })
}
