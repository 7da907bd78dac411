//! Platform keychain session storage
//!
//! Persists each session field as its own keychain entry under a single
//! service name (macOS Keychain, Windows Credential Manager, Linux kernel
//! keyutils via `keyring`).

use crmdesk_domain::{CrmDeskError, Result};
use keyring::Entry;
use tracing::debug;

use super::storage::SessionStorage;
use crate::errors::InfraError;

/// Session storage backed by the platform keychain
pub struct KeychainSessionStorage {
    service_name: String,
}

impl KeychainSessionStorage {
    /// Create a keychain storage for a specific service
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "CRMDesk.session")
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service_name, key).map_err(|e| CrmDeskError::from(InfraError::from(e)))
    }
}

impl SessionStorage for KeychainSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        debug!(service = %self.service_name, key = %key, "Reading session field from keychain");

        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        debug!(service = %self.service_name, key = %key, "Writing session field to keychain");

        self.entry(key)?.set_password(value).map_err(|e| InfraError::from(e).into())
    }

    fn remove(&self, key: &str) -> Result<()> {
        debug!(service = %self.service_name, key = %key, "Deleting session field from keychain");

        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = "CRMDeskTest.session.roundtrip";

    #[test]
    #[ignore = "requires a platform keychain service"]
    fn value_written_by_one_instance_is_read_by_another() {
        KeychainSessionStorage::new(SERVICE).set("crmdesk.access_token", "A1").unwrap();

        let reopened = KeychainSessionStorage::new(SERVICE);
        assert_eq!(reopened.get("crmdesk.access_token").unwrap().as_deref(), Some("A1"));

        reopened.remove("crmdesk.access_token").unwrap();
        assert_eq!(KeychainSessionStorage::new(SERVICE).get("crmdesk.access_token").unwrap(), None);
    }

    #[test]
    #[ignore = "requires a platform keychain service"]
    fn session_survives_manager_reload() {
        use std::sync::Arc;

        use crate::session::SessionManager;

        let service = "CRMDeskTest.session.reload";
        SessionManager::new(Arc::new(KeychainSessionStorage::new(service)))
            .set_session("A1", "R1", 3600)
            .unwrap();

        let reloaded = SessionManager::new(Arc::new(KeychainSessionStorage::new(service)));
        assert_eq!(reloaded.access_token().as_deref(), Some("A1"));
        assert_eq!(reloaded.refresh_token().as_deref(), Some("R1"));

        reloaded.clear();
        assert!(SessionManager::new(Arc::new(KeychainSessionStorage::new(service)))
            .session()
            .is_none());
    }

    #[test]
    fn keeps_service_name() {
        assert_eq!(KeychainSessionStorage::new(SERVICE).service_name(), SERVICE);
    }
}
