//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use glue_domain::{ErrorPayloadPolicy, GlueError};
use glue_infra::config;
use tempfile::NamedTempFile;

fn write_temp(contents: &str, extension: &str) -> (NamedTempFile, std::path::PathBuf) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    (temp_file, path)
}

#[test]
fn test_load_full_config_from_toml_file() {
    let toml_content = r#"
timeout_secs = 15
accept_invalid_certs = false
follow_redirects = false
max_auth_attempts = 4
auth_backoff_base_ms = 250
refresh_window_secs = 120
safety_margin_ms = 5000
max_transient_retries = 1
retry_backoff_base_ms = 100
coalesce_authentication = false
error_payload_policy = "raise"
default_page_size = 12
"#;
    let (_temp_file, path) = write_temp(toml_content, "toml");

    let config = config::load_from_file(Some(path.clone())).expect("Failed to load TOML config");

    assert_eq!(config.timeout_secs, 15);
    assert!(!config.accept_invalid_certs);
    assert!(!config.follow_redirects);
    assert_eq!(config.max_auth_attempts, 4);
    assert_eq!(config.auth_backoff_base_ms, 250);
    assert_eq!(config.refresh_window_ms(), 120_000);
    assert_eq!(config.safety_margin_ms, 5000);
    assert_eq!(config.max_transient_retries, 1);
    assert_eq!(config.retry_backoff_base_ms, 100);
    assert!(!config.coalesce_authentication);
    assert_eq!(config.error_payload_policy, ErrorPayloadPolicy::Raise);
    assert_eq!(config.default_page_size, 12);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_empty_json_object_is_default() {
    let (_temp_file, path) = write_temp("{}", "json");

    let config = config::load_from_file(Some(path.clone())).expect("Failed to load JSON config");

    assert_eq!(config, glue_domain::ClientConfig::default());

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/glue.json".into()));

    match result {
        Err(GlueError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_wrong_field_type() {
    let (_temp_file, path) = write_temp(r#"{ "timeout_secs": "soon" }"#, "json");

    let result = config::load_from_file(Some(path.clone()));

    assert!(matches!(result, Err(GlueError::Config(msg)) if msg.contains("Invalid JSON")));

    std::fs::remove_file(path).ok();
}
