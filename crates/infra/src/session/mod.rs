//! Session state and its persistence
//!
//! # Module Organization
//!
//! - **[`storage`]**: `SessionStorage` trait and the in-memory backend
//! - **[`keychain`]**: platform keychain backend
//! - **[`manager`]**: `SessionManager`, the only writer of session state

pub mod keychain;
pub mod manager;
pub mod storage;

use std::sync::Arc;

use crmdesk_domain::{SessionBackend, SessionConfig};

pub use keychain::KeychainSessionStorage;
pub use manager::SessionManager;
pub use storage::{MemorySessionStorage, SessionStorage};

/// Build the storage backend selected by configuration.
pub fn storage_from_config(config: &SessionConfig) -> Arc<dyn SessionStorage> {
    match config.backend {
        SessionBackend::Memory => Arc::new(MemorySessionStorage::new()),
        SessionBackend::Keychain => {
            Arc::new(KeychainSessionStorage::new(config.keychain_service.clone()))
        }
    }
}
