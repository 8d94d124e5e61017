//! Debounce guard: a `running` candidate may not override a terminal state
//! reported less than [`DEBOUNCE_WINDOW_MS`] ago. Hosts commonly send a
//! trailing busy status right after going idle.

use chrono::{DateTime, Duration, Utc};

use crate::types::IndicatorState;

pub const DEBOUNCE_WINDOW_MS: i64 = 2000;

pub fn debounce_window() -> Duration {
    Duration::milliseconds(DEBOUNCE_WINDOW_MS)
}

/// Returns false when the candidate must be dropped.
pub fn allows(
    candidate: IndicatorState,
    terminal_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    if candidate != IndicatorState::Running {
        return true;
    }

    match terminal_at {
        None => true,
        // A terminal time in the future (clock stepped back) counts as recent.
        Some(at) => now.signed_duration_since(at) >= debounce_window(),
    }
}
