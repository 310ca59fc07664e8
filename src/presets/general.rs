//! General-purpose assistant: server-side tools only.

use super::{fetch_url_tool, search_web_tool};
use crate::config::{static_prompt, ControllerConfig, ConverseSettings};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant embedded in a site \
administration console. Answer concisely. Use web search or URL fetching when the question \
needs current information.";

/// Controller configuration for the general assistant.
///
/// A system prompt in `settings` replaces the default one.
pub fn config(settings: &ConverseSettings) -> ControllerConfig {
    let prompt = settings
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
    ControllerConfig::builder()
        .maybe_backend(settings.backend())
        .tools(vec![search_web_tool(), fetch_url_tool()])
        .system_prompt(static_prompt(prompt))
        .maybe_max_tokens(settings.max_tokens)
        .build()
}
