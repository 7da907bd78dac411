//! Single-flight token refresh
//!
//! At most one call to the refresh endpoint is in flight at any time. The
//! first caller that needs a new token starts the exchange and parks a
//! [`Shared`] future in the slot; every later caller awaits a clone of it and
//! sees the same outcome. The future empties the slot itself once it settles.
//!
//! On failure the session is cleared and the host is sent to the login route
//! before any awaiter observes the error.
//!
//! Session writes may hit the platform keychain, so they run on the blocking
//! pool rather than on the executor thread driving the exchange.

use std::sync::Arc;
use std::time::Duration;

use crmdesk_domain::constants::REFRESH_PATH;
use crmdesk_domain::{now_millis, RefreshRequest, RefreshResponse, Session};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use reqwest::Method;
use tracing::{debug, info, warn};

use super::errors::ApiError;
use super::navigator::{redirect_to_login, Navigator};
use crate::errors::transport_error;
use crate::http::HttpClient;
use crate::session::SessionManager;

type RefreshFuture = Shared<BoxFuture<'static, Result<String, ApiError>>>;

/// Coordinates access-token refreshes for one authenticated client
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<RefreshInner>,
}

struct RefreshInner {
    http: HttpClient,
    refresh_url: String,
    sessions: Arc<SessionManager>,
    navigator: Arc<dyn Navigator>,
    in_flight: Mutex<Option<RefreshFuture>>,
}

impl RefreshCoordinator {
    pub fn new(
        http: HttpClient,
        base_url: &str,
        sessions: Arc<SessionManager>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: Arc::new(RefreshInner {
                http,
                refresh_url: format!("{base_url}{REFRESH_PATH}"),
                sessions,
                navigator,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Obtain a fresh access token, joining an in-flight refresh if any.
    ///
    /// `seen_token` is the access token the caller was working with. If the
    /// stored token already differs from it, another caller completed a
    /// refresh in the meantime and the stored token is returned without a
    /// new exchange.
    ///
    /// # Errors
    /// Whatever the exchange produced (`NoRefreshToken`, transport or status
    /// errors, `Decode`, `Storage`); the session is already cleared.
    pub async fn refresh(&self, seen_token: Option<&str>) -> Result<String, ApiError> {
        let pending = {
            let mut slot = self.inner.in_flight.lock();
            match slot.as_ref() {
                Some(existing) => {
                    debug!("Joining in-flight token refresh");
                    existing.clone()
                }
                None => {
                    if let Some(current) = self.superseded_token(seen_token) {
                        debug!("Session already refreshed by another request");
                        return Ok(current);
                    }

                    let inner = Arc::clone(&self.inner);
                    let future = async move { inner.run().await }.boxed().shared();
                    *slot = Some(future.clone());
                    future
                }
            }
        };

        pending.await
    }

    /// Whether a refresh is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.lock().is_some()
    }

    fn superseded_token(&self, seen_token: Option<&str>) -> Option<String> {
        let seen = seen_token?;
        let session = self.inner.sessions.session()?;
        let now = now_millis();

        (session.access_token != seen && !session.needs_refresh(now, Duration::ZERO))
            .then_some(session.access_token)
    }
}

impl RefreshInner {
    async fn run(self: Arc<Self>) -> Result<String, ApiError> {
        let outcome = self.exchange().await;

        match &outcome {
            Ok(_) => info!("Access token refreshed"),
            Err(err) => {
                warn!(error = %err, "Token refresh failed; clearing session");
                self.clear_session().await;
                redirect_to_login(self.navigator.as_ref());
            }
        }

        self.in_flight.lock().take();
        outcome
    }

    async fn exchange(&self) -> Result<String, ApiError> {
        let refresh_token = self.sessions.refresh_token().ok_or(ApiError::NoRefreshToken)?;

        debug!("Exchanging refresh token");
        let request = self
            .http
            .request(Method::POST, &self.refresh_url)
            .json(&RefreshRequest { refresh_token });
        let response = self.http.send(request).await?;

        let status = response.status();
        let body = response.text().await.map_err(|err| transport_error(&err, self.http.timeout()))?;
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        let payload: RefreshResponse = serde_json::from_str(&body)
            .map_err(|err| ApiError::Decode(format!("refresh response: {err}")))?;

        let session = Session::from_lifetime(
            &payload.access_token,
            &payload.refresh_token,
            payload.expires_in,
            now_millis(),
        )
        .ok_or_else(|| ApiError::Decode("refresh response carried an unusable token".into()))?;

        let access_token = session.access_token.clone();
        self.store_session(session).await?;
        Ok(access_token)
    }

    async fn store_session(&self, session: Session) -> Result<(), ApiError> {
        let sessions = Arc::clone(&self.sessions);
        tokio::task::spawn_blocking(move || sessions.replace(session))
            .await
            .map_err(|err| ApiError::Storage(format!("session write task failed: {err}")))??;
        Ok(())
    }

    async fn clear_session(&self) {
        let sessions = Arc::clone(&self.sessions);
        if let Err(err) = tokio::task::spawn_blocking(move || sessions.clear()).await {
            warn!(error = %err, "Session clear task failed; clearing inline");
            self.sessions.clear();
        }
    }
}
