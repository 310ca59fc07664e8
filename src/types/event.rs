//! Stream event protocol.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One event emitted by the backend during a conversational turn.
///
/// The set is closed; tags this version does not know deserialize to
/// [`StreamEvent::Unknown`] and are skipped by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental assistant text.
    Text { content: String },
    /// A tool invocation the client may handle locally.
    ToolUse(ToolUse),
    /// A server-side tool started executing.
    ServerToolStart {
        tool_name: String,
        #[serde(default)]
        tool_input: serde_json::Value,
    },
    /// A server-side tool finished.
    ServerToolResult {
        tool_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<serde_json::Value>,
    },
    /// Terminal success, with the incremental cost of this turn.
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input_cost: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output_cost: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total_cost: Option<f64>,
    },
    /// Terminal failure reported by the backend.
    Error { error: String },
    #[serde(other)]
    Unknown,
}

/// Payload of a `tool_use` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: serde_json::Value,
}

impl ToolUse {
    /// Read a string field from the tool input.
    pub fn input_str(&self, field: &str) -> Option<&str> {
        self.tool_input.get(field).and_then(serde_json::Value::as_str)
    }
}

impl StreamEvent {
    /// Create a text delta.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Create a client tool invocation.
    pub fn tool_use(tool_name: impl Into<String>, tool_input: serde_json::Value) -> Self {
        Self::ToolUse(ToolUse {
            tool_name: tool_name.into(),
            tool_input,
        })
    }

    /// Create a `done` event carrying only a total cost.
    pub fn done_with_total(total_cost: f64) -> Self {
        Self::Done {
            input_cost: None,
            output_cost: None,
            total_cost: Some(total_cost),
        }
    }

    /// Create a `done` event with no cost information.
    pub fn done() -> Self {
        Self::Done {
            input_cost: None,
            output_cost: None,
            total_cost: None,
        }
    }

    /// Create a backend error event.
    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    /// Parse one JSON-encoded event.
    pub fn from_json_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }

    /// Static label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::ToolUse(_) => "tool_use",
            Self::ServerToolStart { .. } => "server_tool_start",
            Self::ServerToolResult { .. } => "server_tool_result",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
            Self::Unknown => "unknown",
        }
    }
}
