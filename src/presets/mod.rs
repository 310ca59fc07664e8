//! Ready-made controller configurations for the two chat surfaces.
//!
//! - [`general`]: site-wide assistant, server-side tools only
//! - [`blog`]: post editor assistant with client-side editing tools

pub mod blog;
pub mod general;

use strum::{Display, EnumString};

use crate::tools::{ToolDefinition, ToolSchema};

/// Preset selector, as written on the command line or in settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Preset {
    #[default]
    General,
    Blog,
}

/// Backend-executed web search.
pub fn search_web_tool() -> ToolDefinition {
    ToolDefinition::new(
        "search_web",
        "Search the web for current information.",
        ToolSchema::object().string("query", "Search query", true),
    )
}

/// Backend-executed page fetch.
pub fn fetch_url_tool() -> ToolDefinition {
    ToolDefinition::new(
        "fetch_url",
        "Fetch the text content of a web page.",
        ToolSchema::object().string("url", "Absolute URL to fetch", true),
    )
}
