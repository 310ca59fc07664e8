//! Configuration (layered: code > env > settings file).

pub mod settings;

pub use settings::ConverseSettings;

use std::fmt;
use std::sync::Arc;

use bon::Builder;

use crate::tools::{ToolDefinition, ToolDispatchTable};
use crate::types::BackendTarget;

/// Builds the system prompt at the start of every send.
pub type SystemPromptFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Everything that distinguishes one chat surface from another.
///
/// The session state machine is shared; an assistant supplies only this.
#[derive(Clone, Builder)]
pub struct ControllerConfig {
    /// Backend the transport talks to. `send()` does nothing without one.
    pub backend: Option<BackendTarget>,
    /// Tool schemas advertised with every request.
    #[builder(default)]
    pub tools: Vec<ToolDefinition>,
    /// Handlers for client-handled tools.
    #[builder(default)]
    pub handlers: ToolDispatchTable,
    pub system_prompt: Option<SystemPromptFn>,
    /// Token budget for the response.
    pub max_tokens: Option<u32>,
}

impl ControllerConfig {
    /// Start from resolved settings: backend, token budget and a fixed
    /// system prompt if one is set.
    pub fn from_settings(settings: &ConverseSettings) -> Self {
        let system_prompt = settings.system_prompt.clone().map(static_prompt);
        Self::builder()
            .maybe_backend(settings.backend())
            .maybe_system_prompt(system_prompt)
            .maybe_max_tokens(settings.max_tokens)
            .build()
    }

    pub fn render_system_prompt(&self) -> Option<String> {
        self.system_prompt
            .as_ref()
            .map(|build| build())
            .filter(|prompt| !prompt.trim().is_empty())
    }
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("backend", &self.backend)
            .field("tools", &self.tools.iter().map(|t| &t.name).collect::<Vec<_>>())
            .field("handlers", &self.handlers)
            .field("system_prompt", &self.system_prompt.as_ref().map(|_| ".."))
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Wrap a fixed string as a [`SystemPromptFn`].
pub fn static_prompt(text: impl Into<String>) -> SystemPromptFn {
    let text = text.into();
    Arc::new(move || text.clone())
}
