//! Shared fixtures for the infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use crmdesk_domain::{now_millis, Session};
use crmdesk_infra::{AuthenticatedClient, MemorySessionStorage, Navigator, SessionManager};
use parking_lot::Mutex;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REFRESH_BUFFER: Duration = Duration::from_secs(120);

/// Navigator that remembers every redirect it was asked for.
#[derive(Default)]
pub struct RecordingNavigator {
    current: Mutex<Option<String>>,
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn at(path: &str) -> Self {
        Self { current: Mutex::new(Some(path.to_string())), visited: Mutex::default() }
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> Option<String> {
        self.current.lock().clone()
    }

    fn navigate(&self, path: &str) {
        self.visited.lock().push(path.to_string());
        *self.current.lock() = Some(path.to_string());
    }
}

/// Client wired to a mock server, with its session manager and navigator
/// exposed for assertions.
pub struct Harness {
    pub server: MockServer,
    pub client: AuthenticatedClient,
    pub sessions: Arc<SessionManager>,
    pub storage: Arc<MemorySessionStorage>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_at("/customers").await
    }

    pub async fn start_at(current_path: &str) -> Self {
        let server = MockServer::start().await;
        let storage = Arc::new(MemorySessionStorage::new());
        let sessions = Arc::new(SessionManager::new(storage.clone()));
        let navigator = Arc::new(RecordingNavigator::at(current_path));

        let client = AuthenticatedClient::builder()
            .base_url(server.uri())
            .timeout(Duration::from_secs(5))
            .refresh_buffer(REFRESH_BUFFER)
            .system_proxy(false)
            .session_manager(sessions.clone())
            .navigator(navigator.clone())
            .build()
            .expect("client should build");

        Self { server, client, sessions, storage, navigator }
    }

    /// Store a session expiring `offset_ms` from now.
    pub fn seed_session(&self, access: &str, refresh: &str, offset_ms: i64) {
        let session =
            Session::new(access, refresh, now_millis() + offset_ms).expect("valid session");
        self.sessions.replace(session).expect("session stored");
    }

    /// Mount a refresh endpoint answering with `access`/`refresh`, expected
    /// to be called exactly `times` times.
    pub async fn mount_refresh(&self, access: &str, refresh: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "accessToken": access,
                        "refreshToken": refresh,
                        "expiresIn": 3600
                    }))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(times)
            .mount(&self.server)
            .await;
    }
}
