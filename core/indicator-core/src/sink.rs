//! The presentation layer the reconciler reports to.
//!
//! A sink is anything that can take `(agent, state)` and may fail. The
//! shipped implementation, [`ScriptSink`], runs the indicator script:
//!
//! ```bash
//! bash ~/.local/share/agent-indicator/agent-state.sh --agent opencode --state running
//! ```
//!
//! The script location is resolved once at activation from
//! `AGENT_INDICATOR_DIR`, falling back to `~/.local/share/agent-indicator`.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::error::{IndicatorError, Result, SinkError};
use crate::types::IndicatorState;

pub const SINK_DIR_ENV: &str = "AGENT_INDICATOR_DIR";
pub const SCRIPT_NAME: &str = "agent-state.sh";
const DEFAULT_SINK_DIR: &str = ".local/share/agent-indicator";
const DEFAULT_SHELL: &str = "bash";

pub trait Sink: Send + Sync {
    fn emit(&self, agent: &str, state: IndicatorState) -> std::result::Result<(), SinkError>;
}

impl<T: Sink + ?Sized> Sink for &T {
    fn emit(&self, agent: &str, state: IndicatorState) -> std::result::Result<(), SinkError> {
        (**self).emit(agent, state)
    }
}

impl<T: Sink + ?Sized> Sink for Arc<T> {
    fn emit(&self, agent: &str, state: IndicatorState) -> std::result::Result<(), SinkError> {
        (**self).emit(agent, state)
    }
}

impl<T: Sink + ?Sized> Sink for Box<T> {
    fn emit(&self, agent: &str, state: IndicatorState) -> std::result::Result<(), SinkError> {
        (**self).emit(agent, state)
    }
}

/// Returns the indicator directory (`$AGENT_INDICATOR_DIR` or `~/.local/share/agent-indicator`).
pub fn resolve_sink_dir() -> Result<PathBuf> {
    let override_dir = env::var(SINK_DIR_ENV).ok();
    let home = dirs::home_dir();
    resolve_sink_dir_from(override_dir.as_deref(), home.as_deref())
}

pub fn resolve_sink_dir_from(override_dir: Option<&str>, home: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home.map(|h| h.join(DEFAULT_SINK_DIR))
        .ok_or(IndicatorError::HomeDirNotFound)
}

/// Runs the indicator script once per emitted state and waits for it.
#[derive(Debug, Clone)]
pub struct ScriptSink {
    shell: String,
    script: PathBuf,
}

impl ScriptSink {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            script: script.into(),
        }
    }

    /// Uses the script inside the resolved indicator directory.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(resolve_sink_dir()?.join(SCRIPT_NAME)))
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn script(&self) -> &Path {
        &self.script
    }
}

impl Sink for ScriptSink {
    fn emit(&self, agent: &str, state: IndicatorState) -> std::result::Result<(), SinkError> {
        let output = Command::new(&self.shell)
            .arg(&self.script)
            .args(["--agent", agent, "--state", state.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| SinkError::Spawn {
                script: self.script.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(SinkError::NonZeroExit {
            script: self.script.clone(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
