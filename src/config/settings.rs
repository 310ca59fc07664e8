//! User settings loaded from `settings.toml` and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConverseError, Result};
use crate::types::BackendTarget;

const SETTINGS_FILE_NAME: &str = "settings.toml";

const ENV_BACKEND_URL: &str = "CONVERSE_BACKEND_URL";
const ENV_MODEL: &str = "CONVERSE_MODEL";
const ENV_MAX_TOKENS: &str = "CONVERSE_MAX_TOKENS";
const ENV_SYSTEM_PROMPT: &str = "CONVERSE_SYSTEM_PROMPT";

/// Resolved settings for a controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverseSettings {
    pub backend_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
}

impl ConverseSettings {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load a settings file. A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Self::from_toml_str(&raw)
    }

    /// Read `CONVERSE_*` variables, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let max_tokens = match non_empty(ENV_MAX_TOKENS) {
            Some(raw) => Some(raw.trim().parse::<u32>().map_err(|_| {
                ConverseError::Configuration(format!(
                    "{ENV_MAX_TOKENS} must be a positive integer, got '{raw}'"
                ))
            })?),
            None => None,
        };
        Ok(Self {
            backend_url: non_empty(ENV_BACKEND_URL),
            model: non_empty(ENV_MODEL),
            max_tokens,
            system_prompt: non_empty(ENV_SYSTEM_PROMPT),
        })
    }

    /// Layer `over` on top of `self`; set values in `over` win.
    pub fn merge(self, over: Self) -> Self {
        Self {
            backend_url: over.backend_url.or(self.backend_url),
            model: over.model.or(self.model),
            max_tokens: over.max_tokens.or(self.max_tokens),
            system_prompt: over.system_prompt.or(self.system_prompt),
        }
    }

    /// Settings file layer (explicit path or [`default_path`]) with the
    /// environment on top.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => Self::load(path)?,
            None => Self::load(&default_path())?,
        };
        Ok(file.merge(Self::from_env()?))
    }

    pub fn backend(&self) -> Option<BackendTarget> {
        let url = self.backend_url.as_ref()?;
        let target = BackendTarget::new(url.clone());
        Some(match &self.model {
            Some(model) => target.with_model(model.clone()),
            None => target,
        })
    }
}

/// `~/.converse/settings.toml`, or `.converse/settings.toml` without a home.
pub fn default_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".converse"))
        .unwrap_or_else(|| PathBuf::from(".converse"))
        .join(SETTINGS_FILE_NAME)
}
