use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::api::ApiError;
use crate::errors::transport_error;

/// Thin transport over `reqwest` with a fixed deadline.
///
/// Sends exactly once: the only retry in the stack is the authenticated
/// client's single retry after a 401.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Configured per-request deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute the request. Any HTTP status is `Ok`; only transport failures
    /// (no response) are classified into an `ApiError` here.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build().map_err(|err| transport_error(&err, self.timeout))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, url = %url.path(), "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, url = %url.path(), %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, url = %url.path(), error = %err, "HTTP request failed");
                Err(transport_error(&err, self.timeout))
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    system_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None, system_proxy: true }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` (on by default).
    pub fn system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = ReqwestClient::builder().timeout(self.timeout).default_headers(headers);
        if !self.system_proxy {
            builder = builder.no_proxy();
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}
