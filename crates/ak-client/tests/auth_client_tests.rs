//! Session lifecycle: persistence, event emission, best-effort sign-out

use ak_client::{AuthClient, Client, SessionStore};
use ak_core::SessionEventKind;

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const USER_ID: &str = "00000000-0000-0000-0000-000000000001";

fn session_json(access_token: &str) -> serde_json::Value {
    json!({
        "access_token": access_token,
        "refresh_token": "rt-1",
        "expires_at": 1754550000i64,
        "user": { "id": USER_ID, "email": "user@example.com" }
    })
}

fn auth_client(server_uri: &str, temp: &TempDir) -> AuthClient {
    let client = Arc::new(Client::new(server_uri, "anon-key"));
    let store = SessionStore::new(temp.path().join("session.json"));
    AuthClient::new(client, store)
}

#[tokio::test]
async fn test_initialize_without_persisted_session_emits_none() {
    let temp = TempDir::new().unwrap();
    let auth = auth_client("http://127.0.0.1:1", &temp);
    let mut events = auth.subscribe();

    let session = auth.initialize().unwrap();

    assert!(session.is_none());
    let change = events.recv().await.unwrap();
    assert_eq!(change.kind, SessionEventKind::InitialSession);
    assert!(change.session.is_none());
}

#[tokio::test]
async fn test_initialize_reports_persisted_session() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("session.json"),
        session_json("at-persisted").to_string(),
    )
    .unwrap();
    let auth = auth_client("http://127.0.0.1:1", &temp);
    let mut events = auth.subscribe();

    let session = auth.initialize().unwrap();

    assert_eq!(session.unwrap().access_token, "at-persisted");
    let change = events.recv().await.unwrap();
    assert_eq!(change.kind, SessionEventKind::InitialSession);
    assert!(change.session.is_some());
}

#[tokio::test]
async fn test_sign_in_persists_session_and_emits_event() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("at-1")))
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let auth = auth_client(&mock_server.uri(), &temp);
    let mut events = auth.subscribe();

    auth.sign_in("user@example.com", "secret1").await.unwrap();

    assert!(temp.path().join("session.json").exists());
    assert_eq!(auth.current_session().unwrap().access_token, "at-1");
    let change = events.recv().await.unwrap();
    assert_eq!(change.kind, SessionEventKind::SignedIn);
}

#[tokio::test]
async fn test_sign_out_clears_locally_even_when_backend_fails() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 500,
            "msg": "internal error"
        })))
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("session.json"),
        session_json("at-1").to_string(),
    )
    .unwrap();
    let auth = auth_client(&mock_server.uri(), &temp);
    auth.initialize().unwrap();
    let mut events = auth.subscribe();

    auth.sign_out().await;

    assert!(auth.current_session().is_none());
    assert!(!temp.path().join("session.json").exists());
    let change = events.recv().await.unwrap();
    assert_eq!(change.kind, SessionEventKind::SignedOut);
    assert!(change.session.is_none());
}

#[tokio::test]
async fn test_refresh_session_emits_token_refreshed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("at-2")))
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("session.json"),
        session_json("at-1").to_string(),
    )
    .unwrap();
    let auth = auth_client(&mock_server.uri(), &temp);
    auth.initialize().unwrap();
    let mut events = auth.subscribe();

    let refreshed = auth.refresh_session().await.unwrap();

    assert_eq!(refreshed.access_token, "at-2");
    let change = events.recv().await.unwrap();
    assert_eq!(change.kind, SessionEventKind::TokenRefreshed);
}

#[tokio::test]
async fn test_refresh_without_session_is_an_error() {
    let temp = TempDir::new().unwrap();
    let auth = auth_client("http://127.0.0.1:1", &temp);

    let result = auth.refresh_session().await;

    assert!(result.is_err());
}
