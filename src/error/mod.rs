//! Error types for converse.

use thiserror::Error;

/// Primary error type for all converse operations.
#[derive(Error, Debug)]
pub enum ConverseError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Settings parse error: {0}")]
    SettingsParse(#[from] toml::de::Error),
}

impl ConverseError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a stream error.
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    /// Whether retrying the same send may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Stream(_) | Self::Io(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ConverseError>;
