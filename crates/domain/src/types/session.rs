//! Session model
//!
//! A session is the access/refresh token pair plus the absolute expiry of the
//! access token. It is either complete or absent: a constructor that receives
//! an unusable token returns `None` instead of a half-valid value.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Literal values that leak out of loosely-typed callers and must never be
/// treated as credentials.
const PLACEHOLDER_TOKENS: [&str; 2] = ["undefined", "null"];

/// Returns `true` when `value` can be used as a bearer credential.
///
/// Empty, whitespace-only, `"undefined"` and `"null"` are all rejected.
#[must_use]
pub fn is_usable_token(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && !PLACEHOLDER_TOKENS.contains(&trimmed)
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Authenticated session state
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of the access token, ms since epoch
    pub expires_at_ms: i64,
}

impl Session {
    /// Build a session from an absolute expiry.
    ///
    /// Returns `None` if either token is unusable.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at_ms: i64,
    ) -> Option<Self> {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();

        if !is_usable_token(&access_token) || !is_usable_token(&refresh_token) {
            return None;
        }

        Some(Self { access_token, refresh_token, expires_at_ms })
    }

    /// Build a session whose access token lives `expires_in_secs` from `now_ms`.
    ///
    /// Negative lifetimes are clamped to zero (already expired).
    #[must_use]
    pub fn from_lifetime(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in_secs: i64,
        now_ms: i64,
    ) -> Option<Self> {
        let lifetime_ms = expires_in_secs.max(0).saturating_mul(1000);
        Self::new(access_token, refresh_token, now_ms.saturating_add(lifetime_ms))
    }

    /// Whether the access token expires within `buffer` of `now_ms`.
    #[must_use]
    pub fn needs_refresh(&self, now_ms: i64, buffer: Duration) -> bool {
        let buffer_ms = i64::try_from(buffer.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_add(buffer_ms) >= self.expires_at_ms
    }

    /// Milliseconds until expiry (negative once expired).
    #[must_use]
    pub fn millis_until_expiry(&self, now_ms: i64) -> i64 {
        self.expires_at_ms.saturating_sub(now_ms)
    }

    /// Expiry as a UTC timestamp, if representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.expires_at_ms).single()
    }
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}
