//! Integration tests for configuration loader
//!
//! Loads configuration files from disk and builds a client from them.

use std::io::Write;

use crmdesk_domain::{LogFormat, SessionBackend};
use crmdesk_infra::{config, AuthenticatedClient};
use tempfile::TempDir;

#[test]
fn test_load_config_from_json_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("crmdesk.json");
    let mut file = std::fs::File::create(&path).expect("Failed to create config file");
    file.write_all(
        br#"{
            "api": {
                "base_url": "https://crm.example.com",
                "timeout_secs": 15,
                "refresh_buffer_secs": 60,
                "user_agent": "crmdesk-admin/1.0"
            },
            "session": { "backend": "memory" },
            "logging": { "level": "crmdesk_infra=debug", "format": "json" }
        }"#,
    )
    .expect("Failed to write config file");

    let config = config::load_from_file(Some(path)).expect("config should load");

    assert_eq!(config.api.base_url, "https://crm.example.com");
    assert_eq!(config.api.timeout_secs, 15);
    assert_eq!(config.api.refresh_buffer_secs, 60);
    assert_eq!(config.api.user_agent.as_deref(), Some("crmdesk-admin/1.0"));
    assert_eq!(config.session.backend, SessionBackend::Memory);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_load_config_from_toml_file_with_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[api]\nbase_url = \"https://crm.example.com/\"\n")
        .expect("Failed to write config file");

    let config = config::load_from_file(Some(path)).expect("config should load");

    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.api.refresh_buffer_secs, 120);
    assert_eq!(config.session.backend, SessionBackend::Keychain);
    assert_eq!(config.session.keychain_service, "CRMDesk.session");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_missing_api_section_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("crmdesk.toml");
    std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").expect("Failed to write config file");

    let err = config::load_from_file(Some(path)).unwrap_err();
    assert!(err.to_string().contains("Invalid TOML format"));
}

#[test]
fn test_client_from_loaded_config() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("crmdesk.toml");
    std::fs::write(
        &path,
        "[api]\nbase_url = \"https://crm.example.com/\"\ntimeout_secs = 5\n\n[session]\nbackend = \"memory\"\n",
    )
    .expect("Failed to write config file");

    let config = config::load_from_file(Some(path)).expect("config should load");
    let client = AuthenticatedClient::from_config(&config).expect("client should build");

    assert_eq!(client.base_url(), "https://crm.example.com");
    assert!(!client.is_authenticated());
}

#[test]
fn test_invalid_base_url_fails_client_construction() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("crmdesk.json");
    std::fs::write(&path, r#"{ "api": { "base_url": "crm.example.com" } }"#)
        .expect("Failed to write config file");

    let config = config::load_from_file(Some(path)).expect("config should load");
    assert!(AuthenticatedClient::from_config(&config).is_err());
}
