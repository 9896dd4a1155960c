//! Identity - the backend-issued authenticated principal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated principal as reported by the backend auth subsystem.
/// The reconciler holds this read-only for the duration of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    /// Backends may omit the email (e.g. phone-only principals)
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: Uuid, email: Option<String>) -> Self {
        Self { id, email }
    }
}
