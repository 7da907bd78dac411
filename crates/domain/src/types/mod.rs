//! Domain types and models

pub mod auth;
pub mod pagination;
pub mod session;

pub use auth::{
    AuthResponse, LoginRequest, RefreshRequest, RefreshResponse, RegisterTenantRequest,
    UserContext,
};
pub use pagination::{Page, PageRequest, SortOrder};
pub use session::{is_usable_token, now_millis, Session};
