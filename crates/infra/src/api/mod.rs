//! CRM API access
//!
//! # Module Organization
//!
//! - **[`client`]**: `AuthenticatedClient`, the request pipeline and its builder
//! - **[`refresh`]**: single-flight token refresh
//! - **[`navigator`]**: host hook for redirect-on-session-loss
//! - **[`auth`]**: login, tenant registration, identity and logout endpoints
//! - **[`errors`]**: the `ApiError` taxonomy

pub mod auth;
pub mod client;
pub mod errors;
pub mod navigator;
pub mod refresh;

pub use auth::AuthApi;
pub use client::{is_refresh_exempt, AuthenticatedClient, AuthenticatedClientBuilder};
pub use errors::{ApiError, ApiErrorKind};
pub use navigator::{LoggingNavigator, Navigator};
pub use refresh::RefreshCoordinator;
