//! Auth endpoint payloads
//!
//! Wire shapes for the login, tenant registration and token refresh
//! endpoints. The remote API speaks camelCase JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cached identity of the signed-in user and their tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserContext {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// `POST /api/auth/login` body
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// `POST /api/auth/register-tenant` body
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTenantRequest {
    pub tenant_name: String,
    pub admin_email: String,
    pub admin_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_name: Option<String>,
}

impl fmt::Debug for RegisterTenantRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterTenantRequest")
            .field("tenant_name", &self.tenant_name)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"[redacted]")
            .finish_non_exhaustive()
    }
}

/// Response of login and tenant registration
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    #[serde(default)]
    pub user: Option<UserContext>,
}

/// `POST /api/auth/refresh` and `POST /api/auth/logout` body
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// `POST /api/auth/refresh` response; refresh tokens rotate on every use
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_request_uses_camel_case() {
        let body = serde_json::to_value(RefreshRequest { refresh_token: "R1".into() }).unwrap();
        assert_eq!(body, serde_json::json!({ "refreshToken": "R1" }));
    }

    #[test]
    fn auth_response_parses_optional_user() {
        let response: AuthResponse = serde_json::from_value(serde_json::json!({
            "accessToken": "A1",
            "refreshToken": "R1",
            "expiresIn": 900,
            "user": {
                "id": "u-1",
                "email": "ada@acme.test",
                "tenantId": "t-1",
                "roles": ["ADMIN"]
            }
        }))
        .unwrap();

        let user = response.user.unwrap();
        assert_eq!(user.tenant_id, "t-1");
        assert!(user.has_role("admin"));
        assert!(user.name.is_none());
    }

    #[test]
    fn login_request_debug_hides_password() {
        let request = LoginRequest { email: "ada@acme.test".into(), password: "hunter2".into() };
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
