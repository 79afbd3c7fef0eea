//! HTTP error type and status mapping.
//!
//! Maps the core's typed results onto the statuses the kiosk and teacher
//! UIs expect: 404 unknown student, 400 no active period or malformed
//! input, 409 schedule/roster conflicts, 500 storage failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rollcall_core::{AttendanceError, RepoError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("student not found: {0}")]
    StudentNotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::StudentNotFound(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("event=request_failed module=api status=error error={self}");
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<AttendanceError> for AppError {
    fn from(value: AttendanceError) -> Self {
        match value {
            AttendanceError::UnknownStudent(usn) => Self::StudentNotFound(usn),
            // 400: the caller's clock/schedule mismatch, message carries the
            // attempted time for diagnostics.
            err @ AttendanceError::NoActivePeriod { .. } => Self::BadRequest(err.to_string()),
            AttendanceError::Repo(err) => err.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Period(err) => Self::BadRequest(err.to_string()),
            RepoError::Student(err) => Self::BadRequest(err.to_string()),
            err @ RepoError::ScheduleOverlap { .. } => Self::Conflict(err.to_string()),
            RepoError::Conflict => Self::Conflict("row already exists for this key".to_string()),
            RepoError::NotFound(key) => Self::NotFound(key),
            err @ (RepoError::Db(_) | RepoError::InvalidData(_)) => Self::Internal(err.to_string()),
        }
    }
}
