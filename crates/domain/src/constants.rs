//! Application constants
//!
//! Centralized location for storage keys, endpoint paths and timing defaults
//! shared by the transport and its callers.

// Persisted session keys (all four are cleared together)
pub const ACCESS_TOKEN_KEY: &str = "crmdesk.access_token";
pub const REFRESH_TOKEN_KEY: &str = "crmdesk.refresh_token";
pub const EXPIRES_AT_KEY: &str = "crmdesk.expires_at";
pub const USER_CONTEXT_KEY: &str = "crmdesk.user";

/// Every key owned by the session, in write order.
pub const SESSION_KEYS: [&str; 4] =
    [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, EXPIRES_AT_KEY, USER_CONTEXT_KEY];

// Remote auth endpoints (relative to the API base URL)
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_TENANT_PATH: &str = "/api/auth/register-tenant";
pub const REFRESH_PATH: &str = "/api/auth/refresh";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const CURRENT_USER_PATH: &str = "/api/auth/me";

/// Paths whose 401 responses are surfaced directly instead of refreshing.
pub const REFRESH_EXEMPT_PATHS: [&str; 2] = [LOGIN_PATH, REGISTER_TENANT_PATH];

// Host navigation
pub const AUTH_AREA_PREFIX: &str = "/auth";
pub const LOGIN_ROUTE: &str = "/auth/login";

// Timing defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REFRESH_BUFFER_SECS: u64 = 120;

// Keychain
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "CRMDesk.session";

// Pagination
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;
