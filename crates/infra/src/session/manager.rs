//! Session manager
//!
//! The single owner of session state. Every read and write of the persisted
//! tokens goes through here; the storage handle itself is never exposed.
//!
//! - Reads are served from an in-memory copy loaded at construction
//! - Writes go to storage first, then memory, under one write lock
//! - A session is written whole or not at all; a failed partial write is
//!   rolled back by clearing

use std::sync::Arc;

use crmdesk_domain::constants::{
    ACCESS_TOKEN_KEY, EXPIRES_AT_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_CONTEXT_KEY,
};
use crmdesk_domain::{now_millis, CrmDeskError, Result, Session, UserContext};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::storage::{MemorySessionStorage, SessionStorage};
use crate::errors::InfraError;

/// Process-wide session state with durable persistence
pub struct SessionManager {
    storage: Arc<dyn SessionStorage>,
    current: RwLock<Option<Session>>,
}

impl SessionManager {
    /// Create a manager over `storage`, loading any persisted session.
    ///
    /// Partially written or corrupt persisted state loads as "no session".
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let current = load_session(storage.as_ref());
        if current.is_some() {
            info!("Session manager initialized with persisted session");
        } else {
            debug!("No persisted session found");
        }

        Self { storage, current: RwLock::new(current) }
    }

    /// Manager over a fresh [`MemorySessionStorage`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStorage::new()))
    }

    /// Current session, if any
    pub fn session(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.refresh_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    /// Persist a new session whose access token lives `expires_in_secs`.
    ///
    /// # Errors
    /// `CrmDeskError::InvalidInput` when either token is missing or a
    /// placeholder; the previous session is left untouched. Storage failures
    /// are returned after the partial write has been rolled back.
    pub fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in_secs: i64,
    ) -> Result<Session> {
        let Some(session) =
            Session::from_lifetime(access_token, refresh_token, expires_in_secs, now_millis())
        else {
            warn!("Rejected session write: access or refresh token missing or invalid");
            return Err(CrmDeskError::InvalidInput(
                "access and refresh tokens must both be present".into(),
            ));
        };

        self.replace(session.clone())?;
        Ok(session)
    }

    /// Atomically swap in `session` (all three fields together).
    ///
    /// # Errors
    /// Returns the storage error after clearing any partially written state.
    pub fn replace(&self, session: Session) -> Result<()> {
        let mut current = self.current.write();

        if let Err(err) = self.persist(&session) {
            warn!(error = %err, "Session write failed; clearing partial state");
            self.remove_all();
            *current = None;
            return Err(err);
        }

        *current = Some(session);
        info!("Session stored");
        Ok(())
    }

    /// Erase every session key and the cached user (idempotent, never fails).
    pub fn clear(&self) {
        let mut current = self.current.write();
        let had_session = current.take().is_some();
        self.remove_all();

        if had_session {
            info!("Session cleared");
        } else {
            debug!("Session clear requested with no active session");
        }
    }

    /// Cached user/tenant identity, if stored and readable
    pub fn cached_user(&self) -> Option<UserContext> {
        let raw = match self.storage.get(USER_CONTEXT_KEY) {
            Ok(value) => value?,
            Err(err) => {
                warn!(error = %err, "Failed to read cached user");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "Discarding unreadable cached user");
                None
            }
        }
    }

    /// Cache the signed-in user's identity alongside the session.
    pub fn set_cached_user(&self, user: &UserContext) -> Result<()> {
        let encoded =
            serde_json::to_string(user).map_err(|e| CrmDeskError::from(InfraError::from(e)))?;
        self.storage.set(USER_CONTEXT_KEY, &encoded)?;
        debug!(user_id = %user.id, tenant_id = %user.tenant_id, "Cached user context");
        Ok(())
    }

    fn persist(&self, session: &Session) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, &session.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        self.storage.set(EXPIRES_AT_KEY, &session.expires_at_ms.to_string())
    }

    fn remove_all(&self) {
        for key in SESSION_KEYS {
            if let Err(err) = self.storage.remove(key) {
                warn!(key, error = %err, "Failed to remove session key");
            }
        }
    }
}

fn load_session(storage: &dyn SessionStorage) -> Option<Session> {
    let read = |key: &str| match storage.get(key) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "Failed to read session key");
            None
        }
    };

    let access = read(ACCESS_TOKEN_KEY)?;
    let refresh = read(REFRESH_TOKEN_KEY)?;
    let Ok(expires_at_ms) = read(EXPIRES_AT_KEY)?.trim().parse::<i64>() else {
        warn!("Persisted session has an unreadable expiry; ignoring it");
        return None;
    };

    Session::new(access, refresh, expires_at_ms)
}
