//! Auth endpoints of the CRM API
//!
//! Thin wrappers over [`AuthenticatedClient`] that keep the session and the
//! cached user identity in step with the server's answers.

use crmdesk_domain::constants::{CURRENT_USER_PATH, LOGIN_PATH, LOGOUT_PATH, REGISTER_TENANT_PATH};
use crmdesk_domain::{AuthResponse, LoginRequest, RefreshRequest, RegisterTenantRequest, UserContext};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::client::AuthenticatedClient;
use super::errors::ApiError;

/// Login, tenant registration, identity and logout
#[derive(Clone)]
pub struct AuthApi {
    client: AuthenticatedClient,
}

impl AuthApi {
    pub fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Sign in and store the returned session.
    ///
    /// # Returns
    ///
    /// The user identity when the server included one
    ///
    /// # Errors
    ///
    /// `Unauthorized` for bad credentials (never retried), `BadRequest` when
    /// the server returned unusable tokens, or any transport error
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserContext>, ApiError> {
        let request = LoginRequest { email: email.to_string(), password: password.to_string() };
        let response: AuthResponse = self.client.post(LOGIN_PATH, Some(&request)).await?;

        self.store(&response)?;
        info!("Signed in");
        Ok(response.user)
    }

    /// Create a tenant with its first admin and sign that admin in.
    ///
    /// # Errors
    ///
    /// See [`AuthApi::login`]
    #[instrument(skip(self, request), fields(tenant = %request.tenant_name))]
    pub async fn register_tenant(
        &self,
        request: &RegisterTenantRequest,
    ) -> Result<Option<UserContext>, ApiError> {
        let response: AuthResponse = self.client.post(REGISTER_TENANT_PATH, Some(request)).await?;

        self.store(&response)?;
        info!("Tenant registered");
        Ok(response.user)
    }

    /// Fetch the signed-in identity and refresh the cached copy.
    ///
    /// # Errors
    ///
    /// Any error of the authenticated pipeline
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<UserContext, ApiError> {
        let user: UserContext = self.client.get(CURRENT_USER_PATH, None).await?;

        if let Err(err) = self.client.sessions().set_cached_user(&user) {
            warn!(error = %err, "Failed to cache user context");
        }
        Ok(user)
    }

    /// Revoke the refresh token remotely (best effort) and clear the local
    /// session regardless of the outcome.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.client.sessions().refresh_token() {
            let body = RefreshRequest { refresh_token };
            if let Err(err) = self.client.post::<Value, _>(LOGOUT_PATH, Some(&body)).await {
                warn!(error = %err, "Remote logout failed; clearing local session anyway");
            }
        }

        self.client.clear_session();
        info!("Signed out");
    }

    fn store(&self, response: &AuthResponse) -> Result<(), ApiError> {
        self.client.set_session(
            &response.access_token,
            &response.refresh_token,
            response.expires_in,
        )?;

        if let Some(user) = &response.user {
            self.client.sessions().set_cached_user(user)?;
        }
        Ok(())
    }
}
