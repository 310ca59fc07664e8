//! Conversation timeline and its reconciliation rules.
//!
//! Every mutation a stream event can cause goes through one of the methods
//! here. The rules keep the timeline in causal order:
//!
//! - [`Timeline::append_text`] grows the assistant message of the current send
//! - [`Timeline::insert_tool_message`] places tool activity ahead of it
//! - [`Timeline::finalize_tool_result`] resolves the newest open tool call
//! - [`Timeline::purge_empty_loading`] drops abandoned placeholders

pub mod view;

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{HistoryMessage, Message, MessageKey, Role};

pub use view::{Placement, PresentationRole, RenderedMessage, TimelineView, Variant};

/// Suffix appended to a tool message whose result succeeded.
pub const TOOL_DONE_SUFFIX: &str = " - Done";
/// Suffix appended to a tool message whose result reported an error.
pub const TOOL_FAILED_SUFFIX: &str = " - Failed";
/// Content given to a still-loading empty entry when it is abandoned.
///
/// Empty, so such entries are removed by the same purge.
pub const CANCELLED_PLACEHOLDER: &str = "";
/// Prefix of the assistant content written when a turn fails.
pub const ERROR_PREFIX: &str = "Error: ";

static TRAILING_ELLIPSIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\.{3}|…)\s*$").expect("trailing ellipsis regex must compile")
});

/// Ordered list of conversation entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    messages: Vec<Message>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, key: MessageKey) -> Option<&Message> {
        self.messages.iter().find(|m| m.key == key)
    }

    fn position(&self, key: MessageKey) -> Option<usize> {
        self.messages.iter().position(|m| m.key == key)
    }

    /// Append a message at the end and return its key.
    pub fn push(&mut self, message: Message) -> MessageKey {
        let key = message.key;
        self.messages.push(message);
        key
    }

    /// Append a streamed text delta to the assistant message `key`.
    ///
    /// Returns `false` when no message has that key. An empty delta leaves
    /// the content untouched but still clears `loading`.
    pub fn append_text(&mut self, key: MessageKey, delta: &str) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.key == key) else {
            return false;
        };
        message.content.push_str(delta);
        message.loading = false;
        true
    }

    /// Insert a tool entry relative to the assistant message `assistant_key`.
    ///
    /// While the assistant message is still an empty placeholder the tool
    /// entry takes its slot and the placeholder follows it. Once it has text,
    /// the tool entry goes directly before it and the assistant stops
    /// loading. If the assistant message is gone the entry is appended.
    pub fn insert_tool_message(
        &mut self,
        assistant_key: MessageKey,
        content: impl Into<String>,
        tool_name: impl Into<String>,
        loading: bool,
    ) -> MessageKey {
        let tool = Message::tool(content, tool_name, loading);
        let key = tool.key;
        match self.position(assistant_key) {
            None => {
                tracing::debug!(%assistant_key, "assistant message missing; appending tool entry");
                self.messages.push(tool);
            }
            Some(idx) if self.messages[idx].content.is_empty() => {
                self.messages.insert(idx, tool);
            }
            Some(idx) => {
                self.messages[idx].loading = false;
                self.messages.insert(idx, tool);
            }
        }
        key
    }

    /// Resolve the newest loading tool entry named `tool_name`.
    ///
    /// Returns `false` if no such entry is open; the result is then dropped.
    pub fn finalize_tool_result(&mut self, tool_name: &str, failed: bool) -> bool {
        let Some(message) = self
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.loading && m.is_tool_named(tool_name))
        else {
            tracing::debug!(tool_name, "tool result without an open tool entry; dropped");
            return false;
        };
        let stripped = TRAILING_ELLIPSIS.replace(&message.content, "").into_owned();
        let suffix = if failed {
            TOOL_FAILED_SUFFIX
        } else {
            TOOL_DONE_SUFFIX
        };
        message.content = stripped + suffix;
        message.loading = false;
        true
    }

    /// Stop every loading entry and remove the ones left empty.
    ///
    /// Returns the number of removed entries.
    pub fn purge_empty_loading(&mut self) -> usize {
        for message in self.messages.iter_mut().filter(|m| m.loading) {
            message.loading = false;
            if message.content.is_empty() {
                message.content = CANCELLED_PLACEHOLDER.to_string();
            }
        }
        let before = self.messages.len();
        self.messages.retain(|m| !m.content.is_empty());
        before - self.messages.len()
    }

    /// Overwrite the content of `key` and clear its `loading` flag.
    pub fn replace_content(&mut self, key: MessageKey, content: impl Into<String>) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.key == key) else {
            return false;
        };
        message.content = content.into();
        message.loading = false;
        true
    }

    /// Clear the `loading` flag of `key`.
    pub fn finish(&mut self, key: MessageKey) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.key == key) else {
            return false;
        };
        message.loading = false;
        true
    }

    /// Messages eligible as prompt history: everything but tool entries and
    /// empty content.
    pub fn history(&self) -> Vec<HistoryMessage> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::Tool && !m.content.is_empty())
            .map(HistoryMessage::from)
            .collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
