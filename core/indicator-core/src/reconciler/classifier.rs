//! Maps host notifications and hooks to candidate indicator states.
//! Anything not listed yields no opinion; `Off` is never a candidate.

use crate::notification::{HookCall, Notification, SessionStatus};
use crate::types::IndicatorState;

/// Tool whose invocation means the agent is asking the user something.
pub const QUESTION_TOOL: &str = "question";

pub fn classify(notification: &Notification) -> Option<IndicatorState> {
    match notification {
        Notification::SessionStatus {
            status: SessionStatus::Busy,
        } => Some(IndicatorState::Running),
        Notification::SessionStatus { .. } => None,
        Notification::PermissionUpdated | Notification::PermissionAsked => {
            Some(IndicatorState::NeedsInput)
        }
        Notification::SessionIdle | Notification::SessionError => Some(IndicatorState::Done),
        Notification::ToolExecuteBefore { tool } => classify_tool(tool),
        Notification::Unknown { .. } => None,
    }
}

pub fn classify_hook(hook: &HookCall) -> Option<IndicatorState> {
    match hook {
        HookCall::PermissionAsk => Some(IndicatorState::NeedsInput),
        HookCall::ToolExecuteBefore { tool } => classify_tool(tool),
    }
}

fn classify_tool(tool: &str) -> Option<IndicatorState> {
    (tool == QUESTION_TOOL).then_some(IndicatorState::NeedsInput)
}
