//! Indicator state shared by the reconciler, the sink, and the CLI.
//!
//! The string forms are part of the sink's command-line contract
//! (`--state needs-input`), so they must not change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the activity indicator is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndicatorState {
    /// Initial value, and the reset signal sent ahead of `Running`.
    #[default]
    Off,
    Running,
    NeedsInput,
    Done,
}

impl IndicatorState {
    pub const ALL: [IndicatorState; 4] = [
        IndicatorState::Off,
        IndicatorState::Running,
        IndicatorState::NeedsInput,
        IndicatorState::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorState::Off => "off",
            IndicatorState::Running => "running",
            IndicatorState::NeedsInput => "needs-input",
            IndicatorState::Done => "done",
        }
    }

    /// Terminal states arm the debounce guard.
    pub fn is_terminal(&self) -> bool {
        matches!(self, IndicatorState::Done)
    }
}

impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown indicator state: {0}")]
pub struct UnknownState(pub String);

impl FromStr for IndicatorState {
    type Err = UnknownState;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        IndicatorState::ALL
            .into_iter()
            .find(|state| state.as_str() == value)
            .ok_or_else(|| UnknownState(value.to_string()))
    }
}
