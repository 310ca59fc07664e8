//! Timeline message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Stable identifier of a timeline entry.
pub type MessageKey = Uuid;

/// Who produced a timeline entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// One entry in the conversation timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub key: MessageKey,
    pub role: Role,
    pub content: String,
    pub loading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: String, loading: bool, tool_name: Option<String>) -> Self {
        Self {
            key: Uuid::new_v4(),
            role,
            content,
            loading,
            tool_name,
            created_at: Utc::now(),
        }
    }

    /// A finished user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), false, None)
    }

    /// The empty, loading assistant placeholder created for each send.
    pub fn assistant_placeholder() -> Self {
        Self::new(Role::Assistant, String::new(), true, None)
    }

    /// A finished assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), false, None)
    }

    /// A tool activity entry.
    pub fn tool(content: impl Into<String>, tool_name: impl Into<String>, loading: bool) -> Self {
        Self::new(Role::Tool, content.into(), loading, Some(tool_name.into()))
    }

    pub fn is_tool_named(&self, name: &str) -> bool {
        self.role == Role::Tool && self.tool_name.as_deref() == Some(name)
    }
}

/// A message as sent to the backend in the request history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for HistoryMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn constructors_assign_distinct_keys() {
        let a = Message::user("hi");
        let b = Message::user("hi");
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn placeholder_is_empty_and_loading() {
        let placeholder = Message::assistant_placeholder();
        assert_eq!(placeholder.role, Role::Assistant);
        assert!(placeholder.content.is_empty());
        assert!(placeholder.loading);
        assert!(placeholder.tool_name.is_none());
    }

    #[test]
    fn tool_name_matching_requires_tool_role() {
        let tool = Message::tool("Searching...", "search_web", true);
        assert!(tool.is_tool_named("search_web"));
        assert!(!tool.is_tool_named("fetch_url"));
        assert!(!Message::assistant("search_web").is_tool_named("search_web"));
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(Role::from_str("tool").unwrap(), Role::Tool);
    }
}
