//! Auth endpoint facade against a mock CRM API.

mod support;

use crmdesk_domain::constants::USER_CONTEXT_KEY;
use crmdesk_domain::RegisterTenantRequest;
use crmdesk_infra::{ApiError, AuthApi, SessionStorage};
use serde_json::json;
use support::Harness;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn user_json() -> serde_json::Value {
    json!({
        "id": "u-1",
        "email": "ada@acme.test",
        "name": "Ada",
        "tenantId": "t-1",
        "tenantName": "Acme",
        "roles": ["admin"]
    })
}

#[tokio::test]
async fn login_stores_session_and_user() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "ada@acme.test", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "A1",
            "refreshToken": "R1",
            "expiresIn": 900,
            "user": user_json()
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let auth = AuthApi::new(h.client.clone());
    let user = auth.login("ada@acme.test", "s3cret").await.unwrap().unwrap();

    assert_eq!(user.tenant_id, "t-1");
    assert_eq!(h.client.session().unwrap().access_token, "A1");
    assert_eq!(h.client.cached_user().unwrap().email, "ada@acme.test");
}

#[tokio::test]
async fn login_with_placeholder_tokens_is_rejected() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "undefined",
            "refreshToken": "R1",
            "expiresIn": 900
        })))
        .mount(&h.server)
        .await;

    let auth = AuthApi::new(h.client.clone());
    let err = auth.login("ada@acme.test", "s3cret").await.unwrap_err();

    assert!(matches!(err, ApiError::BadRequest(_)));
    assert!(!h.client.is_authenticated());
}

#[tokio::test]
async fn register_tenant_signs_in_admin() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register-tenant"))
        .and(body_json(json!({
            "tenantName": "Acme",
            "adminEmail": "ada@acme.test",
            "adminPassword": "s3cret",
            "adminName": "Ada"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "accessToken": "A1",
            "refreshToken": "R1",
            "expiresIn": 900,
            "user": user_json()
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let request = RegisterTenantRequest {
        tenant_name: "Acme".into(),
        admin_email: "ada@acme.test".into(),
        admin_password: "s3cret".into(),
        admin_name: Some("Ada".into()),
    };
    let auth = AuthApi::new(h.client.clone());
    let user = auth.register_tenant(&request).await.unwrap();

    assert_eq!(user.unwrap().tenant_name.as_deref(), Some("Acme"));
    assert!(h.client.is_authenticated());
}

#[tokio::test]
async fn current_user_refreshes_cache() {
    let h = Harness::start().await;
    h.seed_session("A1", "R1", 3_600_000);
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&h.server)
        .await;

    let auth = AuthApi::new(h.client.clone());
    let user = auth.current_user().await.unwrap();

    assert!(user.has_role("admin"));
    assert!(h.storage.get(USER_CONTEXT_KEY).unwrap().is_some());
}

#[tokio::test]
async fn logout_clears_even_when_server_fails() {
    let h = Harness::start().await;
    h.seed_session("A1", "R1", 3_600_000);
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(body_json(json!({ "refreshToken": "R1" })))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;

    let auth = AuthApi::new(h.client.clone());
    auth.logout().await;

    assert!(!h.client.is_authenticated());
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn logout_without_session_skips_remote_call() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&h.server)
        .await;

    AuthApi::new(h.client.clone()).logout().await;
    assert!(!h.client.is_authenticated());
}
