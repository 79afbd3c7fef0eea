//! Environment-driven server configuration.

use log::info;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("ROLLCALL_PORT", "5001"),
            db_path: PathBuf::from(load_or("ROLLCALL_DB", "rollcall.db")),
            log_dir: env::var("ROLLCALL_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join("rollcall-logs")),
            log_level: load_or("ROLLCALL_LOG_LEVEL", rollcall_core::default_log_level()),
        }
    }
}

fn load_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    load_or(key, default)
        .parse()
        .map_err(|err| format!("invalid {key} value: {err}"))
        .expect("environment misconfigured")
}
