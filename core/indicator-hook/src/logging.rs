//! Logging setup for the hook binary.
//!
//! stdout carries command output and stderr belongs to the host, so `watch`
//! logs to a daily file under `<indicator dir>/logs/`, keeping the last
//! [`MAX_LOG_FILES`] days. If that directory can't be created we fall back to
//! stderr. The short-lived `config` commands always log to stderr and never
//! touch the log directory.

use fs_err as fs;
use std::env;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

const DEBUG_ENV: &str = "AGENT_INDICATOR_DEBUG_LOG";
const LOG_DIR_NAME: &str = "logs";
const LOG_FILE_PREFIX: &str = "agent-indicator";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(to_file: bool) -> Option<WorkerGuard> {
    let filter = env_filter();
    if !to_file {
        init_stderr(filter);
        return None;
    }

    let log_dir = match indicator_core::sink::resolve_sink_dir() {
        Ok(dir) => log_dir_in(&dir),
        Err(_) => {
            init_stderr(filter);
            return None;
        }
    };

    if fs::create_dir_all(&log_dir).is_err() {
        init_stderr(filter);
        return None;
    }

    let appender = match file_appender(&log_dir) {
        Ok(appender) => appender,
        Err(_) => {
            init_stderr(filter);
            return None;
        }
    };

    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn log_dir_in(sink_dir: &Path) -> PathBuf {
    sink_dir.join(LOG_DIR_NAME)
}

fn file_appender(log_dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
}

fn env_filter() -> EnvFilter {
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn init_stderr(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
