use ak_client::{AuthClient, Client, SessionStore};
use ak_session::SessionManager;

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;
use wiremock::MockServer;

/// Build a manager wired to the mock backend, with session persistence in
/// a throwaway directory.
pub fn manager_for(server: &MockServer, temp: &TempDir) -> Arc<SessionManager> {
    let client = Arc::new(Client::new(&server.uri(), "anon-key"));
    let store = SessionStore::new(temp.path().join("session.json"));
    let auth = Arc::new(AuthClient::new(Arc::clone(&client), store));

    Arc::new(SessionManager::new(client, auth))
}

pub fn profile_row(id: Uuid, email: Option<&str>, nick_name: Option<&str>) -> serde_json::Value {
    json!({
        "id": id.to_string(),
        "name": null,
        "nick_name": nick_name,
        "phone": null,
        "birth_day": null,
        "email": email,
        "created_at": "2026-08-07T00:00:00Z",
        "update_at": "2026-08-07T00:00:00Z"
    })
}

pub fn session_json(id: Uuid, access_token: &str) -> serde_json::Value {
    json!({
        "access_token": access_token,
        "refresh_token": "rt-1",
        "expires_at": 1754550000i64,
        "user": { "id": id.to_string(), "email": "user@example.com" }
    })
}
