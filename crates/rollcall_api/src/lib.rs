//! HTTP surface for the Rollcall attendance tracker.
//!
//! Thin glue over `rollcall_core`: deserialize and validate request
//! bodies, invoke the core services, map typed results to status codes.
//! All business invariants live in the core crate.

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, post},
    Router,
};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use routes::{
    create_period_handler, create_student_handler, delete_period_handler, health_handler,
    list_attendance_handler, list_students_handler, list_timetable_handler,
    mark_attendance_handler, present_count_handler, report_handler,
};
use state::AppState;

/// Builds the full application router over shared state.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/periodwise-attendance", post(mark_attendance_handler))
        .route("/api/attendance", get(list_attendance_handler))
        .route("/api/attendance/stats", get(present_count_handler))
        .route(
            "/api/timetable",
            get(list_timetable_handler).post(create_period_handler),
        )
        .route("/api/timetable/{id}", delete(delete_period_handler))
        .route(
            "/api/students",
            get(list_students_handler).post(create_student_handler),
        )
        .route("/api/reports/custom", get(report_handler))
        .layer(cors)
        .with_state(state)
}

/// Loads configuration, opens the database and serves until shutdown.
pub async fn start_server() {
    let config = Config::load();

    if let Err(err) = rollcall_core::init_logging(
        &config.log_level,
        &config.log_dir.to_string_lossy(),
    ) {
        eprintln!("logging disabled: {err}");
    }

    let conn = rollcall_core::db::open_db(&config.db_path)
        .unwrap_or_else(|err| {
            error!("event=server_start module=api status=error error={err}");
            panic!("failed to open database at {}: {err}", config.db_path.display());
        });

    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(conn, config);
    let app = app(state);

    info!("event=server_start module=api status=ok address={address}");

    let listener = TcpListener::bind(&address)
        .await
        .expect("failed to bind server address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    info!("event=server_stop module=api status=ok");
}

async fn shutdown_signal() {
    let interrupt = async {
        ctrl_c().await.expect("failed to install Ctrl+C handler");
        info!("event=server_shutdown module=api status=start reason=interrupt");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("event=server_shutdown module=api status=start reason=terminate");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}
