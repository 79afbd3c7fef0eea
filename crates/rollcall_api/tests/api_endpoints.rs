use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rollcall_api::config::Config;
use rollcall_api::routes::{
    create_period_handler, create_student_handler, list_timetable_handler,
    mark_attendance_handler, report_handler, CreatePeriodRequest, CreateStudentRequest,
    MarkAttendanceRequest, ReportParams,
};
use rollcall_api::state::AppState;
use rollcall_core::db::open_db_in_memory;
use std::sync::Arc;

fn test_state() -> Arc<AppState> {
    let conn = open_db_in_memory().unwrap();
    AppState::new(conn, Config::load())
}

async fn seed(state: &Arc<AppState>) {
    let status = create_student_handler(
        State(state.clone()),
        Json(CreateStudentRequest {
            name: "Alice".to_string(),
            usn: "S1".to_string(),
            course: "CS".to_string(),
        }),
    )
    .await
    .unwrap()
    .into_response()
    .status();
    assert_eq!(status, StatusCode::CREATED);

    // 2024-01-01 is a Monday.
    let status = create_period_handler(
        State(state.clone()),
        Json(CreatePeriodRequest {
            subject: "Math".to_string(),
            day: "Monday".to_string(),
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
        }),
    )
    .await
    .unwrap()
    .into_response()
    .status();
    assert_eq!(status, StatusCode::CREATED);
}

async fn mark(state: &Arc<AppState>, usn: &str, at: &str) -> Result<StatusCode, StatusCode> {
    let result = mark_attendance_handler(
        State(state.clone()),
        Json(MarkAttendanceRequest {
            usn: usn.to_string(),
            recognized_at: at.to_string(),
        }),
    )
    .await;

    match result {
        Ok(ok) => Ok(ok.into_response().status()),
        Err(err) => Err(err.into_response().status()),
    }
}

#[tokio::test]
async fn attendance_status_codes_follow_outcomes() {
    let state = test_state();
    seed(&state).await;

    // First recognition inside the period.
    assert_eq!(
        mark(&state, "S1", "2024-01-01T09:15:00").await,
        Ok(StatusCode::CREATED)
    );

    // Polling again a few minutes later is a success no-op.
    assert_eq!(
        mark(&state, "S1", "2024-01-01T09:20:00").await,
        Ok(StatusCode::OK)
    );

    // After the period ends.
    assert_eq!(
        mark(&state, "S1", "2024-01-01T10:05:00").await,
        Err(StatusCode::BAD_REQUEST)
    );

    // Unknown roster entry.
    assert_eq!(
        mark(&state, "NONEXISTENT_ID", "2024-01-01T09:15:00").await,
        Err(StatusCode::NOT_FOUND)
    );

    // Malformed timestamp never reaches the core.
    assert_eq!(
        mark(&state, "S1", "nine o'clock").await,
        Err(StatusCode::BAD_REQUEST)
    );
}

#[tokio::test]
async fn overlapping_period_returns_conflict() {
    let state = test_state();
    seed(&state).await;

    let err = create_period_handler(
        State(state.clone()),
        Json(CreatePeriodRequest {
            subject: "Physics".to_string(),
            day: "Monday".to_string(),
            start_time: "09:30".to_string(),
            end_time: "10:30".to_string(),
        }),
    )
    .await
    .err()
    .unwrap();

    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

    let listed = list_timetable_handler(State(state.clone()))
        .await
        .unwrap()
        .into_response();
    assert_eq!(listed.status(), StatusCode::OK);
}

#[tokio::test]
async fn report_endpoint_serves_csv() {
    let state = test_state();
    seed(&state).await;
    mark(&state, "S1", "2024-01-01T09:15:00").await.unwrap();

    let response = report_handler(
        State(state.clone()),
        Query(ReportParams {
            subject: "Math".to_string(),
            from: None,
            to: None,
            kind: Some("summary".to_string()),
        }),
    )
    .await
    .unwrap()
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .unwrap();
    assert_eq!(content_type, "text/csv");
}
