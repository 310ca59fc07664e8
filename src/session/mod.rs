//! One in-flight send: request assembly, event dispatch, cancellation.
//!
//! A session walks `Idle → Sending → Streaming → {Completed | Cancelled |
//! Failed}`. Events are applied one at a time in delivery order; every
//! mutation re-checks the cancellation token under the store lock.

pub(crate) mod store;

pub use store::Conversation;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use strum::Display;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ControllerConfig;
use crate::timeline::ERROR_PREFIX;
use crate::tools::{server_tool_start_text, ToolInsert};
use crate::transport::Transport;
use crate::types::{
    ConversationRequest, HistoryMessage, Message, MessageKey, Role, StreamEvent, ToolUse,
};

use store::ConversationStore;

/// Unique session identifier.
pub type SessionId = Uuid;

/// Controller-level lifecycle phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Sending,
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

impl SessionPhase {
    /// Whether a session is in flight.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Sending | Self::Streaming)
    }
}

/// Terminal status of a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    Completed,
    Cancelled,
    Failed,
}

impl From<SessionStatus> for SessionPhase {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Completed => Self::Completed,
            SessionStatus::Cancelled => Self::Cancelled,
            SessionStatus::Failed => Self::Failed,
        }
    }
}

/// Outcome of one send.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionResult {
    pub session_id: SessionId,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl SessionResult {
    fn new(session_id: SessionId, status: SessionStatus, error: Option<String>) -> Self {
        Self {
            session_id,
            status,
            error,
            finished_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

/// Ephemeral state of one send-to-completion cycle.
pub(crate) struct ConversationSession<'a> {
    id: SessionId,
    cancel: CancellationToken,
    store: &'a ConversationStore,
    config: &'a ControllerConfig,
    assistant_key: Option<MessageKey>,
}

impl<'a> ConversationSession<'a> {
    pub(crate) fn new(
        id: SessionId,
        cancel: CancellationToken,
        store: &'a ConversationStore,
        config: &'a ControllerConfig,
    ) -> Self {
        Self {
            id,
            cancel,
            store,
            config,
            assistant_key: None,
        }
    }

    /// Drive the session to a terminal state.
    ///
    /// The caller has already checked input and backend and claimed the
    /// active slot.
    pub(crate) async fn run(mut self, transport: &dyn Transport, input: String) -> SessionResult {
        let Some(request) = self.prepare(input) else {
            return self.finish(SessionStatus::Cancelled, None);
        };
        self.store.set_phase(SessionPhase::Streaming);
        tracing::info!(
            session_id = %self.id,
            history = request.history.len(),
            tools = request.tools.len(),
            "conversation session start"
        );

        let mut stream = match transport.open(request, self.cancel.clone()).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::debug!(session_id = %self.id, retryable = err.is_retryable(), "open failed");
                return self.fail(err.to_string());
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return self.finish(SessionStatus::Cancelled, None);
                }
                next = stream.next() => next,
            };
            let event = match next {
                Some(Ok(event)) => event,
                Some(Err(err)) => {
                    tracing::debug!(session_id = %self.id, retryable = err.is_retryable(), "stream failed");
                    return self.fail(err.to_string());
                }
                None => {
                    tracing::debug!(session_id = %self.id, "stream ended without terminal event");
                    return self.complete(None, None, None);
                }
            };
            tracing::debug!(session_id = %self.id, event = event.kind(), "dispatch");
            if let Some(result) = self.dispatch(event) {
                return result;
            }
        }
    }

    /// Append the user message and assistant placeholder, and assemble the
    /// outgoing request from the history that preceded them.
    fn prepare(&mut self, input: String) -> Option<ConversationRequest> {
        let backend = self.config.backend.clone()?;
        let system_prompt = self.config.render_system_prompt();
        let (history, assistant_key) = self.store.mutate_live(&self.cancel, |c| {
            let mut history = c.timeline.history();
            history.push(HistoryMessage {
                role: Role::User,
                content: input.clone(),
            });
            c.timeline.push(Message::user(input));
            let key = c.timeline.push(Message::assistant_placeholder());
            (history, key)
        })?;
        self.assistant_key = Some(assistant_key);
        Some(ConversationRequest {
            backend,
            history,
            system_prompt,
            tools: self.config.tools.clone(),
            max_tokens: self.config.max_tokens,
        })
    }

    /// Apply one event. Returns the result once the session is terminal.
    fn dispatch(&self, event: StreamEvent) -> Option<SessionResult> {
        let assistant = self.assistant_key?;
        let applied = match event {
            StreamEvent::Text { content } => self
                .store
                .mutate_live(&self.cancel, |c| {
                    c.timeline.append_text(assistant, &content);
                })
                .is_some(),
            StreamEvent::ToolUse(tool_use) => self.dispatch_tool_use(assistant, &tool_use),
            StreamEvent::ServerToolStart {
                tool_name,
                tool_input,
            } => {
                let text = server_tool_start_text(&tool_name, &tool_input);
                self.store
                    .mutate_live(&self.cancel, |c| {
                        c.timeline
                            .insert_tool_message(assistant, text, tool_name, true);
                    })
                    .is_some()
            }
            StreamEvent::ServerToolResult { tool_name, error } => {
                if error.is_some() {
                    tracing::debug!(session_id = %self.id, tool_name = %tool_name, "server tool failed");
                }
                self.store
                    .mutate_live(&self.cancel, |c| {
                        c.timeline.finalize_tool_result(&tool_name, error.is_some());
                    })
                    .is_some()
            }
            StreamEvent::Done {
                input_cost,
                output_cost,
                total_cost,
            } => return Some(self.complete(input_cost, output_cost, total_cost)),
            StreamEvent::Error { error } => return Some(self.fail(error)),
            StreamEvent::Unknown => {
                tracing::debug!(session_id = %self.id, "ignoring unrecognized event");
                true
            }
        };
        if applied {
            None
        } else {
            Some(self.finish(SessionStatus::Cancelled, None))
        }
    }

    /// Hand a `tool_use` to its client handler. The handler runs outside the
    /// store lock; its inserts take the lock themselves.
    fn dispatch_tool_use(&self, assistant: MessageKey, tool_use: &ToolUse) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        if !self.config.handlers.contains(&tool_use.tool_name) {
            tracing::debug!(
                session_id = %self.id,
                tool_name = %tool_use.tool_name,
                "no client handler for tool; ignored"
            );
            return true;
        }
        let store = self.store;
        let cancel = &self.cancel;
        let insert = move |content: &str, tool_name: &str| {
            store.mutate_live(cancel, |c| {
                c.timeline
                    .insert_tool_message(assistant, content, tool_name, false);
            });
        };
        self.config
            .handlers
            .dispatch(tool_use, &ToolInsert::new(&insert));
        !self.cancel.is_cancelled()
    }

    fn complete(
        &self,
        input_cost: Option<f64>,
        output_cost: Option<f64>,
        total_cost: Option<f64>,
    ) -> SessionResult {
        let applied = self.store.mutate_live(&self.cancel, |c| {
            c.costs.record(input_cost, output_cost, total_cost);
            if let Some(key) = self.assistant_key {
                c.timeline.finish(key);
            }
        });
        match applied {
            Some(()) => self.finish(SessionStatus::Completed, None),
            None => self.finish(SessionStatus::Cancelled, None),
        }
    }

    fn fail(&self, error: String) -> SessionResult {
        let content = format!("{ERROR_PREFIX}{error}");
        let applied = self.store.mutate_live(&self.cancel, |c| {
            let replaced = self
                .assistant_key
                .is_some_and(|key| c.timeline.replace_content(key, content.clone()));
            if !replaced {
                c.timeline.push(Message::assistant(content));
            }
            c.timeline.purge_empty_loading();
        });
        match applied {
            Some(()) => self.finish(SessionStatus::Failed, Some(error)),
            None => self.finish(SessionStatus::Cancelled, None),
        }
    }

    fn finish(&self, status: SessionStatus, error: Option<String>) -> SessionResult {
        match &error {
            Some(error) => {
                tracing::warn!(session_id = %self.id, %status, %error, "conversation session failed")
            }
            None => tracing::info!(session_id = %self.id, %status, "conversation session finished"),
        }
        SessionResult::new(self.id, status, error)
    }
}
