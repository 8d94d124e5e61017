//! Error types for indicator-core operations.
//!
//! Reconciliation itself never fails. These errors come from resolving paths,
//! reading and writing the config file, and invoking the sink.

use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// Sink Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// A single failed attempt to hand a state to the presentation layer.
///
/// The reporter absorbs these; they exist so sinks have something concrete to
/// return and tests have something to assert on.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to start sink {script}: {source}")]
    Spawn {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sink {script} exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit {
        script: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "signal".to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Ambient Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from configuration and path resolution.
#[derive(Debug, thiserror::Error)]
pub enum IndicatorError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Configuration write failed: {path}: {source}")]
    ConfigWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config path: {0:?}")]
    InvalidDotPath(String),

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using IndicatorError.
pub type Result<T> = std::result::Result<T, IndicatorError>;
