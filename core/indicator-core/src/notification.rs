//! Host notifications and hook invocations.
//!
//! The host speaks JSON shaped like `{"type": "session.status", "properties": {...}}`.
//! [`HostEvent`] mirrors that shape loosely so unknown event types and extra
//! fields never fail to parse; [`HostEvent::to_notification`] turns it into the
//! typed [`Notification`] the classifier works on.

use serde::Deserialize;
use serde_json::Value;

pub const SESSION_STATUS: &str = "session.status";
pub const PERMISSION_UPDATED: &str = "permission.updated";
pub const PERMISSION_ASKED: &str = "permission.asked";
pub const SESSION_IDLE: &str = "session.idle";
pub const SESSION_ERROR: &str = "session.error";
pub const TOOL_EXECUTE_BEFORE: &str = "tool.execute.before";
pub const PERMISSION_ASK: &str = "permission.ask";

/// Session status reported with `session.status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Busy,
    Idle,
    Retry,
    Other(String),
}

impl SessionStatus {
    fn from_kind(kind: &str) -> Self {
        match kind {
            "busy" => SessionStatus::Busy,
            "idle" => SessionStatus::Idle,
            "retry" => SessionStatus::Retry,
            other => SessionStatus::Other(other.to_string()),
        }
    }
}

/// A lifecycle event from the host's general event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    SessionStatus { status: SessionStatus },
    PermissionUpdated,
    PermissionAsked,
    SessionIdle,
    SessionError,
    ToolExecuteBefore { tool: String },
    Unknown { kind: String },
}

/// A host hook invoked directly, outside the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "hook")]
pub enum HookCall {
    #[serde(rename = "permission.ask")]
    PermissionAsk,
    #[serde(rename = "tool.execute.before")]
    ToolExecuteBefore { tool: String },
}

/// Raw event as delivered by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct HostEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub properties: Value,
}

impl HostEvent {
    pub fn to_notification(&self) -> Notification {
        match self.event_type.as_str() {
            SESSION_STATUS => {
                let kind = self
                    .properties
                    .pointer("/status/type")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Notification::SessionStatus {
                    status: SessionStatus::from_kind(kind),
                }
            }
            PERMISSION_UPDATED => Notification::PermissionUpdated,
            PERMISSION_ASKED => Notification::PermissionAsked,
            SESSION_IDLE => Notification::SessionIdle,
            SESSION_ERROR => Notification::SessionError,
            TOOL_EXECUTE_BEFORE => Notification::ToolExecuteBefore {
                tool: self
                    .properties
                    .get("tool")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            other => Notification::Unknown {
                kind: other.to_string(),
            },
        }
    }
}

/// One line of the host stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HostMessage {
    Event { event: HostEvent },
    Hook(HookCall),
    Bare(HostEvent),
}
