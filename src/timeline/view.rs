//! Render-ready projection of the timeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{Timeline, ERROR_PREFIX};
use crate::types::{CostTotals, Message, MessageKey, Role};

/// Role vocabulary of the chat UI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PresentationRole {
    User,
    Ai,
    System,
}

/// Which side of the conversation a bubble sits on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Placement {
    Start,
    End,
}

/// Bubble styling hint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Variant {
    Filled,
    Outlined,
    Borderless,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderedMessage {
    pub key: MessageKey,
    pub role: PresentationRole,
    pub content: String,
    pub loading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    pub placement: Placement,
    pub variant: Variant,
}

impl RenderedMessage {
    fn from_message(message: &Message) -> Self {
        let (role, placement, variant) = match message.role {
            Role::User => (PresentationRole::User, Placement::End, Variant::Filled),
            Role::Assistant if message.content.starts_with(ERROR_PREFIX) => {
                (PresentationRole::Ai, Placement::Start, Variant::Outlined)
            }
            Role::Assistant => (PresentationRole::Ai, Placement::Start, Variant::Filled),
            Role::Tool => (PresentationRole::System, Placement::Start, Variant::Borderless),
        };
        Self {
            key: message.key,
            role,
            content: message.content.clone(),
            loading: message.loading,
            tool_name: message.tool_name.clone(),
            placement,
            variant,
        }
    }
}

/// Snapshot of everything the chat UI draws.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TimelineView {
    pub items: Vec<RenderedMessage>,
    pub is_streaming: bool,
    pub costs: CostTotals,
}

impl TimelineView {
    /// Project the timeline. Entries that are empty and no longer loading
    /// have nothing to show and are left out.
    pub fn project(timeline: &Timeline, costs: CostTotals, is_streaming: bool) -> Self {
        let items = timeline
            .messages()
            .iter()
            .filter(|m| m.loading || !m.content.is_empty())
            .map(RenderedMessage::from_message)
            .collect();
        Self {
            items,
            is_streaming,
            costs,
        }
    }
}
