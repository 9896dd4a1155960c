//! Session envelope returned by the backend auth endpoints.

use crate::Identity;

use serde::{Deserialize, Serialize};

/// A backend session: opaque tokens plus the identity they belong to.
/// Tokens are never inspected locally; expiry bookkeeping is the backend's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp, absent when the backend does not report one
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: Identity,
}
