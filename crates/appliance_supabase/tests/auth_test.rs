use appliance_common::error::ApplianceError;
use appliance_common::models::IdentityEvent;
use appliance_common::services::{IdentityProvider, TokenVerifier};
use appliance_supabase::{SupabaseAuth, SupabaseClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, SupabaseAuth) {
    let server = MockServer::start().await;
    let client = SupabaseClient::with_client(reqwest::Client::new(), &server.uri(), "anon-key", None);
    (server, SupabaseAuth::new(client))
}

fn token_body(access_token: &str, refresh_token: &str) -> serde_json::Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": refresh_token,
        "user": { "id": "user-1", "email": "owner@example.com" }
    })
}

#[tokio::test]
async fn test_password_sign_in_then_refresh_then_sign_out() {
    let (server, auth) = setup().await;
    let mut events = auth.subscribe();

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(body_partial_json(json!({ "email": "owner@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("t1", "r1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_partial_json(json!({ "refresh_token": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("t2", "r2")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let identity = auth
        .sign_in_with_password("owner@example.com", "hunter2")
        .await
        .unwrap();
    assert_eq!(identity.user_id, "user-1");
    assert_eq!(identity.email.as_deref(), Some("owner@example.com"));
    assert_eq!(events.recv().await.unwrap(), IdentityEvent::SignedIn(identity));

    let refreshed = auth.refresh_session().await.unwrap();
    assert_eq!(refreshed.access_token.as_deref(), Some("t2"));
    assert_eq!(
        events.recv().await.unwrap(),
        IdentityEvent::TokenRefreshed(refreshed.clone())
    );
    assert_eq!(auth.current_identity().await.unwrap(), Some(refreshed));

    auth.sign_out().await;
    assert_eq!(events.recv().await.unwrap(), IdentityEvent::SignedOut);
    assert_eq!(auth.current_identity().await.unwrap(), None);
}

#[tokio::test]
async fn test_rejected_credentials_are_not_authenticated() {
    let (server, auth) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let err = auth
        .sign_in_with_password("owner@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, ApplianceError::NotAuthenticated(m) if m == "Invalid login credentials"));
    assert_eq!(auth.current_identity().await.unwrap(), None);
}

#[tokio::test]
async fn test_verify_resolves_token_owner() {
    let (server, auth) = setup().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-1",
            "email": "owner@example.com"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "msg": "JWT expired" })))
        .mount(&server)
        .await;

    let identity = auth.verify("good").await.unwrap();
    assert_eq!(identity.user_id, "user-1");
    assert_eq!(identity.access_token.as_deref(), Some("good"));

    let err = auth.verify("expired").await.unwrap_err();
    assert!(matches!(err, ApplianceError::NotAuthenticated(m) if m == "JWT expired"));
}

#[tokio::test]
async fn test_sign_out_clears_session_when_logout_fails() {
    let (server, auth) = setup().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user-1" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    auth.set_session("restored", None).await.unwrap();
    assert!(auth.current_identity().await.unwrap().is_some());
    assert!(matches!(
        auth.refresh_session().await.unwrap_err(),
        ApplianceError::NotAuthenticated(_)
    ));

    auth.sign_out().await;
    assert_eq!(auth.current_identity().await.unwrap(), None);
}
