//! Drives one reconciler from the host's event stream.
//!
//! The host plugin forwards each event and hook call to our stdin as one JSON
//! object per line:
//!
//! ```text
//! {"event": {"type": "session.status", "properties": {"status": {"type": "busy"}}}}
//! {"hook": "permission.ask"}
//! {"hook": "tool.execute.before", "tool": "question"}
//! {"type": "session.idle", "properties": {}}
//! ```
//!
//! Lines are applied strictly in order. A bad line is logged and skipped;
//! nothing on the stream can stop the watcher short of EOF.

use indicator_core::{HostMessage, IndicatorError, Outcome, Reconciler, ScriptSink, Sink};
use std::io::{self, BufRead};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to read host stream: {0}")]
    Read(#[from] io::Error),

    #[error("Cannot locate indicator script: {0}")]
    Sink(#[from] IndicatorError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamStats {
    pub lines: u64,
    pub malformed: u64,
    pub ignored: u64,
    pub vetoed: u64,
    pub unchanged: u64,
    pub reported: u64,
    pub undelivered: u64,
}

impl StreamStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Ignored => self.ignored += 1,
            Outcome::Vetoed => self.vetoed += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Reported { delivered, .. } => {
                self.reported += 1;
                if !delivered {
                    self.undelivered += 1;
                }
            }
        }
    }
}

pub fn run(agent: &str, script: Option<PathBuf>) -> Result<StreamStats, WatchError> {
    let sink = match script {
        Some(path) => ScriptSink::new(path),
        None => ScriptSink::from_env()?,
    };
    tracing::info!(agent = %agent, script = %sink.script().display(), "Watching host stream");

    let reconciler = Reconciler::new(agent, sink);
    let stdin = io::stdin();
    let stats = process_stream(stdin.lock(), &reconciler)?;

    tracing::info!(
        lines = stats.lines,
        reported = stats.reported,
        undelivered = stats.undelivered,
        unchanged = stats.unchanged,
        vetoed = stats.vetoed,
        ignored = stats.ignored,
        malformed = stats.malformed,
        "Host stream closed"
    );
    Ok(stats)
}

pub fn process_stream<R: BufRead, S: Sink>(
    mut reader: R,
    reconciler: &Reconciler<S>,
) -> io::Result<StreamStats> {
    let mut stats = StreamStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(err) => {
                stats.lines += 1;
                stats.malformed += 1;
                tracing::warn!(error = %err, line = stats.lines, "Skipping host message that is not UTF-8");
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        stats.lines += 1;

        let message: HostMessage = match serde_json::from_str(trimmed) {
            Ok(message) => message,
            Err(err) => {
                stats.malformed += 1;
                tracing::warn!(error = %err, line = stats.lines, "Skipping malformed host message");
                continue;
            }
        };

        let outcome = match message {
            HostMessage::Event { event } | HostMessage::Bare(event) => {
                reconciler.handle_event(&event.to_notification())
            }
            HostMessage::Hook(hook) => reconciler.handle_hook(&hook),
        };
        stats.record(outcome);
    }

    Ok(stats)
}
