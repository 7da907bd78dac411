//! # CRMDesk Domain
//!
//! Pure types shared by every CRMDesk crate.
//!
//! This crate contains:
//! - The session model and the token validity rules
//! - Auth endpoint payloads and the cached user/tenant identity
//! - Pagination envelopes used by list screens
//! - Configuration structures, constants and the domain error type
//!
//! ## Architecture
//! - No dependencies on other CRMDesk crates
//! - No I/O: storage, HTTP and logging setup live in `crmdesk-infra`

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
