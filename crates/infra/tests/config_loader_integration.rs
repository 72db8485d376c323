//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use prophy_domain::ConfigError;
use prophy_infra::config;
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let path = write_config(
        r#"{
            "api_key": "json-key",
            "organization_code": "acme",
            "base_url": "https://staging.prophy.ai/api/",
            "timeout_seconds": 45,
            "jwt": {"issuer": "Acme", "expiration_seconds": 600}
        }"#,
        "json",
    );

    let config = config::load_from_file(Some(path.clone())).expect("config should load");

    assert_eq!(config.api_key, "json-key");
    assert_eq!(config.base_url, "https://staging.prophy.ai/api/");
    assert_eq!(config.timeout_seconds, 45);
    assert_eq!(config.jwt.issuer, "Acme");
    assert_eq!(config.jwt.audience, "Prophy");
    assert_eq!(config.jwt.expiration_seconds, 600);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let path = write_config(
        r#"
api_key = "toml-key"
organization_code = "acme"

[jwt]
login_url = "https://sso.acme.org/prophy/"
clock_skew_seconds = 60
"#,
        "toml",
    );

    let config = config::load_from_file(Some(path.clone())).expect("config should load");

    assert_eq!(config.api_key, "toml-key");
    assert_eq!(config.jwt.login_url, "https://sso.acme.org/prophy/");
    assert_eq!(config.jwt.clock_skew_seconds, 60);
    assert_eq!(config.timeout_seconds, 30);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_file_config_is_validated() {
    let path = write_config(r#"{"api_key": "k", "organization_code": "  "}"#, "json");

    let err = config::load_from_file(Some(path.clone())).unwrap_err();
    assert_eq!(err, ConfigError::Missing("organization_code".into()));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let err = config::load_from_file(Some("/nonexistent/path/prophy.json".into())).unwrap_err();
    assert!(err.to_string().contains("not found"), "unexpected error: {err}");
}

#[test]
fn test_load_config_with_invalid_format() {
    let path = write_config(r#"{ "this is": "not valid" "#, "json");

    match config::load_from_file(Some(path.clone())) {
        Err(ConfigError::Parse { message, .. }) => {
            assert!(message.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected parse error, got {other:?}"),
    }

    std::fs::remove_file(path).ok();
}
