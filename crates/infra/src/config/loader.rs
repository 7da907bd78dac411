//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `CRMDESK_API_BASE_URL` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CRMDESK_API_BASE_URL`: Base URL of the CRM API (required)
//! - `CRMDESK_API_TIMEOUT_SECS`: Per-request deadline in seconds
//! - `CRMDESK_REFRESH_BUFFER_SECS`: Proactive refresh window in seconds
//! - `CRMDESK_API_USER_AGENT`: User-Agent header override
//! - `CRMDESK_API_USE_SYSTEM_PROXY`: `false` to ignore `HTTP_PROXY`/`HTTPS_PROXY`
//! - `CRMDESK_SESSION_BACKEND`: `keychain` (default) or `memory`
//! - `CRMDESK_KEYCHAIN_SERVICE`: Keychain service name
//! - `CRMDESK_LOG_LEVEL`: Default log filter
//! - `CRMDESK_LOG_FORMAT`: `pretty`, `compact` or `json`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./crmdesk.json` or `./crmdesk.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crmdesk_domain::constants::{DEFAULT_REFRESH_BUFFER_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crmdesk_domain::{
    ApiConfig, Config, CrmDeskError, LogFormat, LoggingConfig, Result, SessionBackend,
    SessionConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] = ["crmdesk.json", "crmdesk.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the base URL is not
/// set there, falls back to loading from a config file.
///
/// # Errors
/// Returns `CrmDeskError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `CRMDESK_API_BASE_URL` is required; every other variable falls back
/// to its default.
///
/// # Errors
/// Returns `CrmDeskError::Config` if the base URL is missing or a variable
/// has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let base_url = env_var("CRMDESK_API_BASE_URL")?;

    let api = ApiConfig {
        base_url,
        timeout_secs: env_parse("CRMDESK_API_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        refresh_buffer_secs: env_parse("CRMDESK_REFRESH_BUFFER_SECS")?
            .unwrap_or(DEFAULT_REFRESH_BUFFER_SECS),
        user_agent: env_opt("CRMDESK_API_USER_AGENT"),
        use_system_proxy: env_parse("CRMDESK_API_USE_SYSTEM_PROXY")?.unwrap_or(true),
    };

    let mut session = SessionConfig::default();
    if let Some(backend) = env_parse::<SessionBackend>("CRMDESK_SESSION_BACKEND")? {
        session.backend = backend;
    }
    if let Some(service) = env_opt("CRMDESK_KEYCHAIN_SERVICE") {
        session.keychain_service = service;
    }

    let mut logging = LoggingConfig::default();
    if let Some(level) = env_opt("CRMDESK_LOG_LEVEL") {
        logging.level = level;
    }
    if let Some(format) = env_parse::<LogFormat>("CRMDESK_LOG_FORMAT")? {
        logging.format = format;
    }

    validate(Config { api, session, logging })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CrmDeskError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CrmDeskError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CrmDeskError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CrmDeskError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path).and_then(validate)
}

/// Parse configuration from string content, detecting the format by
/// extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CrmDeskError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CrmDeskError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CrmDeskError::Config(format!("Unsupported config format: {extension}"))),
    }
}

fn validate(config: Config) -> Result<Config> {
    if config.api.base_url.trim().is_empty() {
        return Err(CrmDeskError::Config("api.base_url must not be empty".into()));
    }
    if config.api.timeout_secs == 0 {
        return Err(CrmDeskError::Config("api.timeout_secs must be greater than zero".into()));
    }
    Ok(config)
}

/// Probe the working directory, then the executable's directory, for
/// `crmdesk.{json,toml}` and `config.{json,toml}`.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        CrmDeskError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Optional environment variable; blank values count as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| CrmDeskError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
