//! Reconciliation behavior against a wiremock backend: lazy creation,
//! idempotence, conflict convergence, degraded states and event ordering.

mod common;

use common::{manager_for, profile_row};

use ak_core::Identity;

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path, query_param},
};

fn identity() -> Identity {
    Identity::new(Uuid::new_v4(), Some("user@example.com".to_string()))
}

#[tokio::test]
async fn test_first_sign_in_creates_default_profile() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let user = identity();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/user_info"))
        .and(body_string_contains(user.id.to_string()))
        .and(body_string_contains("user@example.com"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([profile_row(user.id, Some("user@example.com"), None)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_for(&server, &temp);
    manager.handle_session_event(Some(user.clone())).await;

    let state = manager.state();
    assert!(!state.loading);
    assert_eq!(state.identity, Some(user.clone()));
    let profile = state.profile.expect("profile should be created lazily");
    assert_eq!(profile.id, user.id);
    assert_eq!(profile.email.as_deref(), Some("user@example.com"));
}

#[tokio::test]
async fn test_second_event_is_a_pure_fetch() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let user = identity();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([profile_row(user.id, Some("user@example.com"), None)])),
        )
        .expect(2)
        .mount(&server)
        .await;
    // no insert may happen once the row exists
    Mock::given(method("POST"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let manager = manager_for(&server, &temp);
    manager.handle_session_event(Some(user.clone())).await;
    manager.handle_session_event(Some(user.clone())).await;

    assert!(manager.state().profile.is_some());
}

#[tokio::test]
async fn test_creation_conflict_converges_on_existing_row() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let user = identity();

    // first fetch: absent; re-fetch after the conflict: present
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([profile_row(
                user.id,
                Some("user@example.com"),
                Some("ferris")
            )])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"user_info_pkey\""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_for(&server, &temp);
    manager.handle_session_event(Some(user.clone())).await;

    let profile = manager.state().profile.expect("existing row should win");
    assert_eq!(profile.nick_name.as_deref(), Some("ferris"));
}

#[tokio::test]
async fn test_concurrent_creation_attempts_converge_on_one_row() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let user = identity();

    // both attempts see an absent row; only one insert can win
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([profile_row(user.id, Some("user@example.com"), None)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/user_info"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([profile_row(user.id, Some("user@example.com"), None)])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"user_info_pkey\""
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, &temp);
    let first = {
        let manager = manager.clone();
        let user = user.clone();
        tokio::spawn(async move { manager.handle_session_event(Some(user)).await })
    };
    let second = {
        let manager = manager.clone();
        let user = user.clone();
        tokio::spawn(async move { manager.handle_session_event(Some(user)).await })
    };
    first.await.unwrap();
    second.await.unwrap();

    let state = manager.state();
    assert!(!state.loading);
    assert_eq!(state.identity, Some(user.clone()));
    let profile = state.profile.expect("both attempts should converge");
    assert_eq!(profile.id, user.id);
}

#[tokio::test]
async fn test_non_conflict_creation_failure_publishes_degraded_state() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let user = identity();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "XX000",
            "message": "internal error"
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, &temp);
    manager.handle_session_event(Some(user.clone())).await;

    let state = manager.state();
    assert!(!state.loading);
    assert_eq!(state.identity, Some(user));
    assert!(state.profile.is_none());
    assert!(state.needs_profile_setup());
}

#[tokio::test]
async fn test_conflict_refetch_backfills_missing_email() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let user = identity();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([profile_row(user.id, None, None)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"user_info_pkey\""
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/user_info"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .and(body_string_contains("user@example.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([profile_row(user.id, Some("user@example.com"), None)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_for(&server, &temp);
    manager.handle_session_event(Some(user.clone())).await;

    let profile = manager.state().profile.expect("row should be usable");
    assert_eq!(profile.email.as_deref(), Some("user@example.com"));
}

#[tokio::test]
async fn test_fetch_failure_publishes_degraded_state() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let user = identity();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "XX000",
            "message": "internal error"
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, &temp);
    manager.handle_session_event(Some(user.clone())).await;

    let state = manager.state();
    assert_eq!(state.identity, Some(user));
    assert!(state.profile.is_none());
}

#[tokio::test]
async fn test_signed_out_event_clears_published_state() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let user = identity();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([profile_row(user.id, Some("user@example.com"), None)])),
        )
        .mount(&server)
        .await;

    let manager = manager_for(&server, &temp);
    manager.handle_session_event(Some(user)).await;
    assert!(manager.state().is_authenticated());

    manager.handle_session_event(None).await;

    let state = manager.state();
    assert!(!state.loading);
    assert!(state.identity.is_none());
    assert!(state.profile.is_none());
}

#[tokio::test]
async fn test_sign_out_clears_state_even_when_backend_fails() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let user = identity();

    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([profile_row(user.id, Some("user@example.com"), None)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 500,
            "msg": "internal error"
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, &temp);
    manager.handle_session_event(Some(user)).await;
    assert!(manager.state().is_authenticated());

    manager.sign_out().await;

    let state = manager.state();
    assert!(!state.is_authenticated());
    assert!(state.profile.is_none());
}

#[tokio::test]
async fn test_stale_reconciliation_cannot_overwrite_newer_identity() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let slow_user = identity();
    let fast_user = identity();

    // the older identity's fetch is slow; the newer one wins the publish
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .and(query_param("id", format!("eq.{}", slow_user.id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([profile_row(slow_user.id, Some("slow@example.com"), None)]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/user_info"))
        .and(query_param("id", format!("eq.{}", fast_user.id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([profile_row(fast_user.id, Some("fast@example.com"), None)])),
        )
        .mount(&server)
        .await;

    let manager = manager_for(&server, &temp);

    let slow = {
        let manager = manager.clone();
        let slow_user = slow_user.clone();
        tokio::spawn(async move { manager.handle_session_event(Some(slow_user)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    manager.handle_session_event(Some(fast_user.clone())).await;
    slow.await.unwrap();

    let state = manager.state();
    assert_eq!(state.identity, Some(fast_user.clone()));
    assert_eq!(state.profile.map(|p| p.id), Some(fast_user.id));
}

#[tokio::test]
async fn test_refresh_state_retries_reconciliation_for_current_session() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    // no session: refresh settles into signed-out rather than hanging
    let manager = manager_for(&server, &temp);
    manager.refresh_state().await;

    let state = manager.state();
    assert!(!state.loading);
    assert!(!state.is_authenticated());
}
