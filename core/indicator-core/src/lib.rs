//! # indicator-core
//!
//! Core library for agent-indicator: turns a coding agent's lifecycle events
//! into a four-state activity indicator (`off`, `running`, `needs-input`,
//! `done`) and reports each change to an external sink once.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Hosts can wrap with async if needed.
//! - **One reconciler per session**: No process-wide state; each session owns a [`Reconciler`].
//! - **Best effort**: A failing sink never surfaces to the host.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use indicator_core::{HostEvent, Reconciler, ScriptSink};
//!
//! let reconciler = Reconciler::new("opencode", ScriptSink::from_env()?);
//! let event: HostEvent = serde_json::from_str(line)?;
//! reconciler.handle_event(&event.to_notification());
//! reconciler.on_tool_execute_before("question");
//! ```

pub mod config;
pub mod error;
pub mod notification;
pub mod reconciler;
pub mod sink;
pub mod types;

pub use config::ConfigStore;
pub use error::{IndicatorError, Result, SinkError};
pub use notification::{HookCall, HostEvent, HostMessage, Notification, SessionStatus};
pub use reconciler::{Outcome, Reconciler, ReconcilerState, DEBOUNCE_WINDOW_MS};
pub use sink::{ScriptSink, Sink};
pub use types::IndicatorState;
