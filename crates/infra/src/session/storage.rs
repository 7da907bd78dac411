//! Durable key/value storage behind the session manager
//!
//! Backends only move strings; validation and the all-or-nothing session
//! rules live in [`super::SessionManager`].

use std::collections::HashMap;

use crmdesk_domain::Result;
use parking_lot::Mutex;

/// Key/value store for session fields
///
/// Implementations must make `remove` idempotent: removing a missing key is
/// `Ok(())`.
pub trait SessionStorage: Send + Sync {
    /// Read a value, `Ok(None)` when absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value (idempotent)
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
