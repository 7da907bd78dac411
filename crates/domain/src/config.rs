//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_KEYCHAIN_SERVICE, DEFAULT_REFRESH_BUFFER_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::impl_enum_str_conversions;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API configuration consumed when the client is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the CRM API (e.g., "https://crm.example.com")
    pub base_url: String,
    /// Transport deadline per request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Refresh proactively when the access token expires within this window
    #[serde(default = "default_refresh_buffer_secs")]
    pub refresh_buffer_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Route requests through the proxies named by `HTTP_PROXY`/`HTTPS_PROXY`
    #[serde(default = "default_use_system_proxy")]
    pub use_system_proxy: bool,
}

impl ApiConfig {
    /// Configuration with default timings for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_buffer_secs: DEFAULT_REFRESH_BUFFER_SECS,
            user_agent: None,
            use_system_proxy: true,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_buffer(&self) -> Duration {
        Duration::from_secs(self.refresh_buffer_secs)
    }
}

/// Where the session tokens are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Process-local map; lost on restart
    Memory,
    /// Platform keychain via `keyring`
    #[default]
    Keychain,
}

impl_enum_str_conversions!(SessionBackend {
    Memory => "memory",
    Keychain => "keychain",
});

/// Session persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: SessionBackend,
    #[serde(default = "default_keychain_service")]
    pub keychain_service: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { backend: SessionBackend::Keychain, keychain_service: default_keychain_service() }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl_enum_str_conversions!(LogFormat {
    Pretty => "pretty",
    Compact => "compact",
    Json => "json",
});

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `CRMDESK_LOG` is not set (e.g. "info", "crmdesk_infra=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: LogFormat::Pretty }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_refresh_buffer_secs() -> u64 {
    DEFAULT_REFRESH_BUFFER_SECS
}

fn default_use_system_proxy() -> bool {
    true
}

fn default_keychain_service() -> String {
    DEFAULT_KEYCHAIN_SERVICE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "api": { "base_url": "https://crm.test" } }"#).unwrap();

        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert_eq!(config.api.refresh_buffer(), Duration::from_secs(120));
        assert!(config.api.use_system_proxy);
        assert_eq!(config.session.backend, SessionBackend::Keychain);
        assert_eq!(config.session.keychain_service, "CRMDesk.session");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn backend_deserializes_lowercase() {
        let session: SessionConfig = serde_json::from_str(r#"{ "backend": "memory" }"#).unwrap();
        assert_eq!(session.backend, SessionBackend::Memory);
    }
}
