//! Indicator Reconciler
//!
//! Turns the host's lifecycle notifications into indicator states and reports
//! each change to the sink exactly once.
//!
//! ```text
//! notification/hook → classifier → guard → de-dup → reporter → sink
//! ```
//!
//! # Module Structure
//!
//! - [`classifier`]: notification → candidate state (pure)
//! - [`guard`]: drops `running` shortly after a terminal notification
//! - [`reporter`]: sink emission, including the `off`→`running` reset
//!
//! # Concurrency
//!
//! One [`Reconciler`] serves one session. Handling a notification holds the
//! state lock across the sink call, so notifications arriving concurrently
//! from different host entry points are applied one at a time and can't both
//! act on a stale `last_reported`.

pub mod classifier;
pub mod guard;
pub mod reporter;

use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::notification::{HookCall, Notification};
use crate::sink::Sink;
use crate::types::IndicatorState;

pub use classifier::{classify, classify_hook};
pub use guard::DEBOUNCE_WINDOW_MS;

/// Mutable bookkeeping owned by a single reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcilerState {
    /// Last state handed to the sink, whether or not the sink succeeded.
    pub last_reported: IndicatorState,
    /// When the last terminal notification arrived.
    pub terminal_at: Option<DateTime<Utc>>,
}

/// What happened to a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Classifier had no opinion.
    Ignored,
    /// `running` arrived inside the debounce window.
    Vetoed,
    /// Candidate matched `last_reported`.
    Unchanged,
    Reported {
        state: IndicatorState,
        delivered: bool,
    },
}

impl Outcome {
    pub fn reported_state(&self) -> Option<IndicatorState> {
        match self {
            Outcome::Reported { state, .. } => Some(*state),
            _ => None,
        }
    }
}

pub struct Reconciler<S: Sink> {
    agent: String,
    sink: S,
    state: Mutex<ReconcilerState>,
}

impl<S: Sink> Reconciler<S> {
    pub fn new(agent: impl Into<String>, sink: S) -> Self {
        Self {
            agent: agent.into(),
            sink,
            state: Mutex::new(ReconcilerState::default()),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn snapshot(&self) -> ReconcilerState {
        *self.lock_state()
    }

    pub fn handle_event(&self, notification: &Notification) -> Outcome {
        self.handle_event_at(notification, Utc::now())
    }

    pub fn handle_event_at(&self, notification: &Notification, now: DateTime<Utc>) -> Outcome {
        let outcome = self.apply(classify(notification), now);
        tracing::trace!(notification = ?notification, outcome = ?outcome, "Event handled");
        outcome
    }

    pub fn handle_hook(&self, hook: &HookCall) -> Outcome {
        self.handle_hook_at(hook, Utc::now())
    }

    pub fn handle_hook_at(&self, hook: &HookCall, now: DateTime<Utc>) -> Outcome {
        let outcome = self.apply(classify_hook(hook), now);
        tracing::trace!(hook = ?hook, outcome = ?outcome, "Hook handled");
        outcome
    }

    /// Host hook fired right before a permission prompt is shown.
    pub fn on_permission_ask(&self) -> Outcome {
        self.handle_hook(&HookCall::PermissionAsk)
    }

    /// Host hook fired before each tool call.
    pub fn on_tool_execute_before(&self, tool: &str) -> Outcome {
        self.handle_hook(&HookCall::ToolExecuteBefore {
            tool: tool.to_string(),
        })
    }

    fn apply(&self, candidate: Option<IndicatorState>, now: DateTime<Utc>) -> Outcome {
        let candidate = match candidate {
            Some(state) => state,
            None => return Outcome::Ignored,
        };

        let mut state = self.lock_state();

        if candidate.is_terminal() {
            state.terminal_at = Some(now);
        }

        if !guard::allows(candidate, state.terminal_at, now) {
            tracing::debug!(
                agent = %self.agent,
                last_reported = %state.last_reported,
                "Running suppressed inside debounce window"
            );
            return Outcome::Vetoed;
        }

        if candidate == state.last_reported {
            return Outcome::Unchanged;
        }

        // Advance before emitting; a failed sink call doesn't roll this back.
        let previous = state.last_reported;
        state.last_reported = candidate;

        let delivered = reporter::report(&self.sink, &self.agent, candidate);
        tracing::debug!(
            agent = %self.agent,
            from = %previous,
            to = %candidate,
            delivered,
            "Indicator state reported"
        );

        Outcome::Reported {
            state: candidate,
            delivered,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ReconcilerState> {
        // A sink that panicked mid-report leaves the state consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::SessionStatus;
    use crate::sink::test_utils::RecordingSink;
    use chrono::Duration;

    const AGENT: &str = "opencode";

    fn busy() -> Notification {
        Notification::SessionStatus {
            status: SessionStatus::Busy,
        }
    }

    fn reconciler() -> Reconciler<RecordingSink> {
        Reconciler::new(AGENT, RecordingSink::default())
    }

    #[test]
    fn test_initial_state() {
        let r = reconciler();
        assert_eq!(r.snapshot(), ReconcilerState::default());
        assert_eq!(r.snapshot().last_reported, IndicatorState::Off);
        assert_eq!(r.snapshot().terminal_at, None);
    }

    #[test]
    fn test_busy_twice_emits_once() {
        let r = reconciler();
        let now = Utc::now();

        assert_eq!(
            r.handle_event_at(&busy(), now),
            Outcome::Reported {
                state: IndicatorState::Running,
                delivered: true
            }
        );
        assert_eq!(r.handle_event_at(&busy(), now), Outcome::Unchanged);
        assert_eq!(
            r.sink().states(),
            vec![IndicatorState::Off, IndicatorState::Running]
        );
        assert_eq!(r.snapshot().last_reported, IndicatorState::Running);
    }

    #[test]
    fn test_permission_asked_from_off() {
        let r = reconciler();
        r.handle_event(&Notification::PermissionAsked);
        assert_eq!(r.sink().states(), vec![IndicatorState::NeedsInput]);
        assert_eq!(r.snapshot().last_reported, IndicatorState::NeedsInput);
    }

    #[test]
    fn test_idle_then_busy_is_vetoed() {
        let r = reconciler();
        let now = Utc::now();

        r.handle_event_at(&Notification::SessionIdle, now);
        assert_eq!(r.snapshot().terminal_at, Some(now));

        let outcome = r.handle_event_at(&busy(), now + Duration::milliseconds(150));
        assert_eq!(outcome, Outcome::Vetoed);
        assert_eq!(r.sink().states(), vec![IndicatorState::Done]);
        assert_eq!(r.snapshot().last_reported, IndicatorState::Done);
    }

    #[test]
    fn test_busy_after_window_resets_and_runs() {
        let r = reconciler();
        let now = Utc::now();

        r.handle_event_at(&Notification::SessionIdle, now);
        let outcome = r.handle_event_at(&busy(), now + Duration::milliseconds(2000));
        assert_eq!(outcome.reported_state(), Some(IndicatorState::Running));
        assert_eq!(
            r.sink().states(),
            vec![
                IndicatorState::Done,
                IndicatorState::Off,
                IndicatorState::Running
            ]
        );
    }

    #[test]
    fn test_error_then_permission_updated_not_vetoed() {
        let r = reconciler();
        let now = Utc::now();

        r.handle_event_at(&Notification::SessionError, now);
        r.handle_event_at(&Notification::PermissionUpdated, now);
        assert_eq!(
            r.sink().states(),
            vec![IndicatorState::Done, IndicatorState::NeedsInput]
        );
    }

    #[test]
    fn test_repeated_idle_refreshes_terminal_time() {
        let r = reconciler();
        let start = Utc::now();

        r.handle_event_at(&Notification::SessionIdle, start);
        let later = start + Duration::milliseconds(1500);
        assert_eq!(
            r.handle_event_at(&Notification::SessionIdle, later),
            Outcome::Unchanged
        );
        assert_eq!(r.snapshot().terminal_at, Some(later));

        // Past the first idle's window but inside the second's.
        let outcome = r.handle_event_at(&busy(), start + Duration::milliseconds(2500));
        assert_eq!(outcome, Outcome::Vetoed);
    }

    #[test]
    fn test_needs_input_then_busy_inside_window_still_vetoed() {
        let r = reconciler();
        let now = Utc::now();

        r.handle_event_at(&Notification::SessionIdle, now);
        r.handle_event_at(&Notification::PermissionAsked, now);
        let outcome = r.handle_event_at(&busy(), now + Duration::milliseconds(500));
        assert_eq!(outcome, Outcome::Vetoed);
        assert_eq!(r.snapshot().last_reported, IndicatorState::NeedsInput);
    }

    #[test]
    fn test_ignored_notification_touches_nothing() {
        let r = reconciler();
        let outcome = r.handle_event(&Notification::Unknown {
            kind: "message.part.updated".to_string(),
        });
        assert_eq!(outcome, Outcome::Ignored);
        assert_eq!(r.snapshot(), ReconcilerState::default());
        assert!(r.sink().calls().is_empty());
    }

    #[test]
    fn test_hooks() {
        let r = reconciler();
        assert_eq!(r.on_tool_execute_before("bash"), Outcome::Ignored);
        assert_eq!(
            r.on_tool_execute_before("question").reported_state(),
            Some(IndicatorState::NeedsInput)
        );
        assert_eq!(r.on_permission_ask(), Outcome::Unchanged);
        assert_eq!(r.sink().states(), vec![IndicatorState::NeedsInput]);
    }

    #[test]
    fn test_sink_failure_keeps_bookkeeping() {
        let r = Reconciler::new(AGENT, RecordingSink::failing_on(&[IndicatorState::Done]));
        let now = Utc::now();

        assert_eq!(
            r.handle_event_at(&Notification::SessionIdle, now),
            Outcome::Reported {
                state: IndicatorState::Done,
                delivered: false
            }
        );
        assert_eq!(r.snapshot().last_reported, IndicatorState::Done);

        // Same state again is de-duplicated even though delivery failed.
        assert_eq!(
            r.handle_event_at(&Notification::SessionError, now),
            Outcome::Unchanged
        );

        // The next distinct state still goes out.
        assert_eq!(
            r.handle_event_at(&Notification::PermissionAsked, now),
            Outcome::Reported {
                state: IndicatorState::NeedsInput,
                delivered: true
            }
        );
    }

    #[test]
    fn test_panicking_sink_does_not_poison_reconciler() {
        let r = std::sync::Arc::new(Reconciler::new(
            AGENT,
            RecordingSink::panicking_on(&[IndicatorState::Done]),
        ));

        let worker = std::sync::Arc::clone(&r);
        let joined = std::thread::spawn(move || {
            worker.handle_event(&Notification::SessionIdle);
        })
        .join();
        assert!(joined.is_err());

        assert_eq!(r.snapshot().last_reported, IndicatorState::Done);
        assert_eq!(
            r.handle_event(&Notification::PermissionAsked)
                .reported_state(),
            Some(IndicatorState::NeedsInput)
        );
    }
}
