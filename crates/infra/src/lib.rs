//! # CRMDesk Infrastructure
//!
//! All I/O behind the CRMDesk dashboard's API access.
//!
//! This crate contains:
//! - The authenticated API client with single-flight token refresh
//! - Session persistence (platform keychain or process memory)
//! - The HTTP transport and error classification
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Pure types come from `crmdesk-domain`
//! - Session state is only ever written through [`session::SessionManager`]

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod session;

// Re-export commonly used items
pub use api::{
    ApiError, ApiErrorKind, AuthApi, AuthenticatedClient, AuthenticatedClientBuilder,
    LoggingNavigator, Navigator,
};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
pub use session::{KeychainSessionStorage, MemorySessionStorage, SessionManager, SessionStorage};
