//! Authenticated API client
//!
//! Every data-access call of the dashboard goes through [`AuthenticatedClient`].
//! A request runs an explicit pipeline:
//!
//! 1. read the session (absent: send without credentials)
//! 2. refresh first when the access token is inside the refresh buffer
//! 3. attach `Authorization: Bearer <token>` and send
//! 4. on a 401 from a non-exempt path, refresh once and resend once
//! 5. decode the body or classify the failure into an [`ApiError`]

use std::sync::Arc;
use std::time::Duration;

use crmdesk_domain::constants::{
    DEFAULT_REFRESH_BUFFER_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, REFRESH_EXEMPT_PATHS,
};
use crmdesk_domain::{now_millis, Config, Page, PageRequest, Session, UserContext};
use once_cell::sync::OnceCell;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::errors::ApiError;
use super::navigator::{LoggingNavigator, Navigator};
use super::refresh::RefreshCoordinator;
use crate::errors::transport_error;
use crate::http::HttpClient;
use crate::session::{storage_from_config, SessionManager, SessionStorage};

static GLOBAL_CLIENT: OnceCell<AuthenticatedClient> = OnceCell::new();

/// Whether `path` is excluded from token refresh (login and registration).
///
/// Only the route before any query string is compared, and it must equal an
/// exempt path exactly (a missing leading `/` is tolerated, as in `endpoint`).
pub fn is_refresh_exempt(path: &str) -> bool {
    let route = path.split_once('?').map_or(path, |(route, _)| route).trim_start_matches('/');
    REFRESH_EXEMPT_PATHS.iter().any(|exempt| exempt.trim_start_matches('/') == route)
}

/// HTTP client that manages bearer tokens for the CRM API
#[derive(Clone)]
pub struct AuthenticatedClient {
    http: HttpClient,
    base_url: String,
    sessions: Arc<SessionManager>,
    refresher: RefreshCoordinator,
    refresh_buffer: Duration,
}

impl AuthenticatedClient {
    /// Create a builder for fluent configuration
    pub fn builder() -> AuthenticatedClientBuilder {
        AuthenticatedClientBuilder::default()
    }

    /// Build a client from loaded configuration, with the configured session
    /// backend and a [`LoggingNavigator`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP
    /// client cannot be created
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let mut builder = Self::builder()
            .base_url(&config.api.base_url)
            .timeout(config.api.timeout())
            .refresh_buffer(config.api.refresh_buffer())
            .system_proxy(config.api.use_system_proxy)
            .session_storage(storage_from_config(&config.session));

        if let Some(agent) = &config.api.user_agent {
            builder = builder.user_agent(agent);
        }

        builder.build()
    }

    /// Install `client` as the process-wide instance.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if a client was already installed
    pub fn install(client: AuthenticatedClient) -> Result<&'static AuthenticatedClient, ApiError> {
        GLOBAL_CLIENT
            .set(client)
            .map_err(|_| ApiError::Config("authenticated client already installed".into()))?;
        GLOBAL_CLIENT
            .get()
            .ok_or_else(|| ApiError::Config("authenticated client not installed".into()))
    }

    /// The process-wide instance, if one was installed
    pub fn global() -> Option<&'static AuthenticatedClient> {
        GLOBAL_CLIENT.get()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a GET request with optional query parameters
    ///
    /// # Errors
    ///
    /// Returns the classified error if the request, a refresh, or decoding
    /// fails
    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<T, ApiError> {
        self.execute(Method::GET, path, query, None).await
    }

    /// Execute a POST request with an optional JSON body
    ///
    /// # Errors
    ///
    /// Returns the classified error if serialization, the request, a refresh,
    /// or decoding fails
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<T, B>(&self, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.execute(Method::POST, path, None, body).await
    }

    /// Execute a PUT request with an optional JSON body
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::post`]
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<T, B>(&self, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.execute(Method::PUT, path, None, body).await
    }

    /// Execute a PATCH request with an optional JSON body
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::post`]
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn patch<T, B>(&self, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.execute(Method::PATCH, path, None, body).await
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::get`]
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::DELETE, path, None, None).await
    }

    /// Fetch one page of a list endpoint.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        request: &PageRequest,
    ) -> Result<Page<T>, ApiError> {
        let params = request.to_query();
        let query: Vec<(&str, &str)> =
            params.iter().map(|(key, value)| (key.as_str(), value.as_str())).collect();
        self.get(path, Some(query.as_slice())).await
    }

    /// Persist a new session. Invalid tokens are rejected and the current
    /// session is kept.
    ///
    /// # Errors
    ///
    /// `ApiError::BadRequest` for a missing or placeholder token,
    /// `ApiError::Storage` if persisting failed
    pub fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_in_secs: i64,
    ) -> Result<(), ApiError> {
        self.sessions.set_session(access_token, refresh_token, expires_in_secs)?;
        Ok(())
    }

    /// Erase the session and cached user. Safe to call repeatedly.
    pub fn clear_session(&self) {
        self.sessions.clear();
    }

    pub fn session(&self) -> Option<Session> {
        self.sessions.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.sessions.is_authenticated()
    }

    pub fn cached_user(&self) -> Option<UserContext> {
        self.sessions.cached_user()
    }

    pub(crate) fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        let exempt = is_refresh_exempt(path);
        let mut token = self.bearer_token(exempt).await?;
        let mut retried = false;

        loop {
            let mut request = self.http.request(method.clone(), &url);
            if let Some(query) = query {
                request = request.query(query);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }
            if let Some(token) = &token {
                request = request.bearer_auth(token);
            }

            debug!(%method, retried, authenticated = token.is_some(), "Dispatching request");
            let response = self.http.send(request).await?;

            if response.status() == StatusCode::UNAUTHORIZED && !retried && !exempt {
                warn!(path, "Request unauthorized; refreshing session and retrying once");
                retried = true;
                token = Some(self.refresher.refresh(token.as_deref()).await?);
                continue;
            }

            return self.decode(path, response).await;
        }
    }

    /// Token to attach to the next attempt, refreshing first when it expires
    /// within the buffer. Exempt paths never trigger a refresh.
    async fn bearer_token(&self, exempt: bool) -> Result<Option<String>, ApiError> {
        let Some(session) = self.sessions.session() else {
            return Ok(None);
        };

        let now = now_millis();
        if exempt || !session.needs_refresh(now, self.refresh_buffer) {
            return Ok(Some(session.access_token));
        }

        debug!(
            expires_in_ms = session.millis_until_expiry(now),
            "Access token inside refresh buffer; refreshing before send"
        );
        self.refresher.refresh(Some(&session.access_token)).await.map(Some)
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        path: &str,
        response: Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body =
            response.text().await.map_err(|err| transport_error(&err, self.http.timeout()))?;

        if !status.is_success() {
            let error = ApiError::from_status(status.as_u16(), &body);
            warn!(path, status = status.as_u16(), error = %error, "Request failed");
            return Err(error);
        }

        let decoded = if status == StatusCode::NO_CONTENT
            || status == StatusCode::RESET_CONTENT
            || body.trim().is_empty()
        {
            serde_json::from_value(Value::Null).map_err(|err| {
                ApiError::Decode(format!(
                    "empty {} response cannot be decoded: {err}",
                    status.as_u16()
                ))
            })?
        } else {
            serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))?
        };

        debug!(path, status = status.as_u16(), "Request succeeded");
        Ok(decoded)
    }

    fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn encode_body<B: Serialize + ?Sized>(body: Option<&B>) -> Result<Option<Value>, ApiError> {
    body.map(serde_json::to_value)
        .transpose()
        .map_err(|err| ApiError::BadRequest(format!("Failed to serialize body: {err}")))
}

/// Builder for [`AuthenticatedClient`]
#[derive(Default)]
pub struct AuthenticatedClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    refresh_buffer: Option<Duration>,
    user_agent: Option<String>,
    system_proxy: Option<bool>,
    storage: Option<Arc<dyn SessionStorage>>,
    sessions: Option<Arc<SessionManager>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl AuthenticatedClientBuilder {
    /// Set the API base URL (e.g., "https://crm.example.com")
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Refresh proactively when the token expires within `buffer`
    pub fn refresh_buffer(mut self, buffer: Duration) -> Self {
        self.refresh_buffer = Some(buffer);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Whether to honour the system proxy environment (default: yes)
    pub fn system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = Some(enabled);
        self
    }

    /// Persist the session in `storage`. Ignored when a session manager is
    /// supplied.
    pub fn session_storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Share an existing session manager
    pub fn session_manager(mut self, sessions: Arc<SessionManager>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Host hook used to redirect to the login route on session loss
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is missing or invalid, or the HTTP client
    /// cannot be created
    pub fn build(self) -> Result<AuthenticatedClient, ApiError> {
        let raw = self.base_url.ok_or_else(|| ApiError::Config("Base URL not set".into()))?;
        let base_url = normalize_base_url(&raw)?;

        let timeout = self.timeout.unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        let refresh_buffer =
            self.refresh_buffer.unwrap_or(Duration::from_secs(DEFAULT_REFRESH_BUFFER_SECS));

        let mut http = HttpClient::builder().timeout(timeout);
        if let Some(agent) = self.user_agent {
            http = http.user_agent(agent);
        }
        if let Some(enabled) = self.system_proxy {
            http = http.system_proxy(enabled);
        }
        let http = http.build()?;

        let sessions = match (self.sessions, self.storage) {
            (Some(sessions), _) => sessions,
            (None, Some(storage)) => Arc::new(SessionManager::new(storage)),
            (None, None) => Arc::new(SessionManager::in_memory()),
        };
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(LoggingNavigator));

        let refresher =
            RefreshCoordinator::new(http.clone(), &base_url, Arc::clone(&sessions), navigator);

        info!(
            base_url = %base_url,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            refresh_buffer_secs = refresh_buffer.as_secs(),
            "Authenticated client ready"
        );

        Ok(AuthenticatedClient { http, base_url, sessions, refresher, refresh_buffer })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|err| ApiError::Config(format!("Invalid base URL '{raw}': {err}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::Config(format!(
            "Base URL must use http or https, got '{}'",
            parsed.scheme()
        )));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
