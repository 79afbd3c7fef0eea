//! HTTP handlers for the attendance, timetable and roster endpoints.
//!
//! Request bodies are explicit structs validated here, before core
//! services run; core functions assume well-typed input.

use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rollcall_core::{
    AddPeriodRequest, AttendanceRecord, AttendanceRepository, AttendanceService, Period,
    RecordListQuery, RecordOutcome, ReportQuery, ReportService, ScheduleService, SqliteAttendanceRepository,
    SqliteScheduleRepository, SqliteStudentRepository, Student, StudentRepository, Weekday,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

const DATE_FMT: &str = "%Y-%m-%d";

fn with_conn<T>(
    state: &AppState,
    run: impl FnOnce(&Connection) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let conn = state
        .conn
        .lock()
        .map_err(|_| AppError::Internal("state lock poisoned".to_string()))?;
    run(&conn)
}

/// Accepts ISO-8601 timestamps with or without an offset. Offset-carrying
/// values (the kiosk sends `toISOString()` output) are taken at their UTC
/// wall-clock reading; no further conversion happens downstream.
fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, AppError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_utc());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| AppError::BadRequest(format!("timestamp must be ISO-8601, got `{trimmed}`")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FMT)
        .map_err(|_| AppError::BadRequest(format!("date must be YYYY-MM-DD, got `{raw}`")))
}

// --- Attendance ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub usn: String,
    pub recognized_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordDto {
    id: Uuid,
    usn: String,
    subject: String,
    recognized_at: String,
    date: String,
}

impl From<AttendanceRecord> for RecordDto {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            id: record.id,
            usn: record.usn,
            subject: record.period_subject,
            recognized_at: record.recognized_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            date: record.date.format(DATE_FMT).to_string(),
        }
    }
}

/// `POST /api/periodwise-attendance` — the recognition loop's write path.
///
/// 201 new record, 200 already recorded, 404 unknown student, 400 no
/// active period or malformed input.
pub async fn mark_attendance_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MarkAttendanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.usn.trim().is_empty() {
        return Err(AppError::BadRequest("usn cannot be empty".to_string()));
    }
    let recognized_at = parse_timestamp(&payload.recognized_at)?;

    let outcome = with_conn(&state, |conn| {
        let service = AttendanceService::new(
            SqliteStudentRepository::new(conn),
            SqliteScheduleRepository::new(conn),
            SqliteAttendanceRepository::new(conn),
        );
        Ok(service.record_attendance(&payload.usn, recognized_at)?)
    })?;

    let response = match outcome {
        RecordOutcome::Recorded(record) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Attendance recorded",
                "record": RecordDto::from(record),
            })),
        ),
        RecordOutcome::AlreadyRecorded {
            usn,
            period_subject,
            date,
        } => (
            StatusCode::OK,
            Json(json!({
                "message": format!("Attendance already recorded for {period_subject} today"),
                "usn": usn,
                "subject": period_subject,
                "date": date.format(DATE_FMT).to_string(),
            })),
        ),
    };

    Ok(response)
}

#[derive(Deserialize, Default)]
pub struct AttendanceListParams {
    pub usn: Option<String>,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<u32>,
}

/// `GET /api/attendance` — newest-first feed with optional filters.
pub async fn list_attendance_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AttendanceListParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = RecordListQuery {
        usn: params.usn,
        subject: params.subject,
        from: params.from.as_deref().map(parse_date).transpose()?,
        to: params.to.as_deref().map(parse_date).transpose()?,
        limit: params.limit,
    };

    let records = with_conn(&state, |conn| {
        Ok(SqliteAttendanceRepository::new(conn).list_records(&query)?)
    })?;

    let dtos: Vec<RecordDto> = records.into_iter().map(RecordDto::from).collect();
    Ok(Json(dtos))
}

#[derive(Deserialize)]
pub struct PresentCountParams {
    pub subject: String,
    pub date: String,
}

/// `GET /api/attendance/stats` — present head-count for one period/date,
/// the number the teacher dashboard shows next to each class.
pub async fn present_count_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PresentCountParams>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&params.date)?;

    let present = with_conn(&state, |conn| {
        Ok(SqliteAttendanceRepository::new(conn).count_present(&params.subject, date)?)
    })?;

    Ok(Json(json!({
        "subject": params.subject,
        "date": date.format(DATE_FMT).to_string(),
        "present": present,
    })))
}

// --- Timetable ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePeriodRequest {
    pub subject: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PeriodDto {
    id: Uuid,
    subject: String,
    day: Weekday,
    start_time: String,
    end_time: String,
}

impl From<Period> for PeriodDto {
    fn from(period: Period) -> Self {
        Self {
            id: period.id,
            start_time: period.start_time(),
            end_time: period.end_time(),
            subject: period.subject,
            day: period.day,
        }
    }
}

/// `POST /api/timetable` — 201 created, 409 overlap, 400 validation.
pub async fn create_period_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePeriodRequest>,
) -> Result<impl IntoResponse, AppError> {
    let day: Weekday = payload
        .day
        .parse()
        .map_err(|err| AppError::BadRequest(format!("{err}")))?;

    let period = with_conn(&state, |conn| {
        let service = ScheduleService::new(SqliteScheduleRepository::new(conn));
        Ok(service.add_period(&AddPeriodRequest {
            subject: payload.subject.clone(),
            day,
            start_time: payload.start_time.clone(),
            end_time: payload.end_time.clone(),
        })?)
    })?;

    Ok((StatusCode::CREATED, Json(PeriodDto::from(period))))
}

/// `GET /api/timetable` — weekly schedule ordered by day and start time.
pub async fn list_timetable_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let periods = with_conn(&state, |conn| {
        let service = ScheduleService::new(SqliteScheduleRepository::new(conn));
        Ok(service.list_periods()?)
    })?;

    let dtos: Vec<PeriodDto> = periods.into_iter().map(PeriodDto::from).collect();
    Ok(Json(dtos))
}

/// `DELETE /api/timetable/{id}` — 204 removed, 404 unknown period.
pub async fn delete_period_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    with_conn(&state, |conn| {
        let service = ScheduleService::new(SqliteScheduleRepository::new(conn));
        Ok(service.remove_period(id)?)
    })?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Roster ---

#[derive(Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub usn: String,
    #[serde(default)]
    pub course: String,
}

/// `POST /api/students` — 201 created, 409 duplicate USN, 400 validation.
pub async fn create_student_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student = Student::new(&payload.usn, payload.name, payload.course);

    with_conn(&state, |conn| {
        SqliteStudentRepository::new(conn).create_student(&student)?;
        Ok(())
    })?;

    Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /api/students` — full roster ordered by USN.
pub async fn list_students_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let students = with_conn(&state, |conn| {
        Ok(SqliteStudentRepository::new(conn).list_students()?)
    })?;

    Ok(Json(students))
}

// --- Reports ---

#[derive(Deserialize)]
pub struct ReportParams {
    pub subject: String,
    pub from: Option<String>,
    pub to: Option<String>,
    /// `detailed` (default) or `summary`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// `GET /api/reports/custom` — CSV download, detailed or summary.
pub async fn report_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.subject.trim().is_empty() {
        return Err(AppError::BadRequest("subject is required".to_string()));
    }

    let query = ReportQuery {
        subject: params.subject.trim().to_string(),
        from: params.from.as_deref().map(parse_date).transpose()?,
        to: params.to.as_deref().map(parse_date).transpose()?,
    };

    let kind = params.kind.as_deref().unwrap_or("detailed");
    let (csv, filename) = with_conn(&state, |conn| {
        let service = ReportService::new(
            SqliteStudentRepository::new(conn),
            SqliteAttendanceRepository::new(conn),
        );
        match kind {
            "summary" => Ok((service.summary_csv(&query)?, "Summary_Report.csv")),
            "detailed" => Ok((service.detailed_csv(&query)?, "Detailed_Report.csv")),
            other => Err(AppError::BadRequest(format!(
                "report type must be `detailed` or `summary`, got `{other}`"
            ))),
        }
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        csv,
    ))
}

// --- Health ---

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": rollcall_core::ping(),
        "version": rollcall_core::core_version(),
    }))
}
