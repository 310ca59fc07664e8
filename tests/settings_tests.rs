//! Tests for settings files and controller configuration.

use std::fs;

use converse::config::{ControllerConfig, ConverseSettings};
use converse::error::ConverseError;

#[test]
fn loads_settings_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(
        &path,
        r#"
backend_url = "https://chat.example.com/stream"
model = "assistant-large"
max_tokens = 2048
"#,
    )
    .unwrap();

    let settings = ConverseSettings::load(&path).unwrap();
    let backend = settings.backend().expect("backend configured");
    assert_eq!(backend.url, "https://chat.example.com/stream");
    assert_eq!(backend.model.as_deref(), Some("assistant-large"));

    let config = ControllerConfig::from_settings(&settings);
    assert_eq!(config.max_tokens, Some(2048));
    assert!(config.backend.is_some());
}

#[test]
fn missing_settings_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ConverseSettings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings, ConverseSettings::default());
    assert!(settings.backend().is_none());
}

#[test]
fn malformed_settings_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "max_tokens = \"lots\"").unwrap();

    let err = ConverseSettings::load(&path).unwrap_err();
    assert!(matches!(err, ConverseError::SettingsParse(_)));
}

#[test]
fn environment_layer_wins_over_file() {
    let file = ConverseSettings::from_toml_str(
        r#"
backend_url = "https://file.example.com"
max_tokens = 100
"#,
    )
    .unwrap();
    let env = ConverseSettings::from_lookup(|key| match key {
        "CONVERSE_BACKEND_URL" => Some("https://env.example.com".to_string()),
        _ => None,
    })
    .unwrap();

    let merged = file.merge(env);
    assert_eq!(merged.backend_url.as_deref(), Some("https://env.example.com"));
    assert_eq!(merged.max_tokens, Some(100));
}
