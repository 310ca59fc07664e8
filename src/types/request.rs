//! Outgoing request types handed to the transport.

use serde::{Deserialize, Serialize};

use super::message::HistoryMessage;
use crate::tools::ToolDefinition;

/// Where a conversation request is sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendTarget {
    /// Endpoint the transport streams from.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl BackendTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Everything the transport needs to open one streaming turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationRequest {
    pub backend: BackendTarget,
    pub history: Vec<HistoryMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}
