//! Shared handler state.

use crate::config::Config;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Application state shared across handlers.
///
/// SQLite connections are not `Sync`, so the single connection sits behind
/// a mutex; the unique indexes remain authoritative even when additional
/// processes point at the same database file.
pub struct AppState {
    pub conn: Mutex<Connection>,
    pub config: Config,
}

impl AppState {
    pub fn new(conn: Connection, config: Config) -> Arc<Self> {
        Arc::new(Self {
            conn: Mutex::new(conn),
            config,
        })
    }
}
