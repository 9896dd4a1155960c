use crate::{Session, SessionEventKind};

use serde::{Deserialize, Serialize};

/// A session-change notification: what happened and the session that
/// resulted (none after sign-out or when no persisted session exists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionChange {
    pub kind: SessionEventKind,
    pub session: Option<Session>,
}

impl SessionChange {
    pub fn new(kind: SessionEventKind, session: Option<Session>) -> Self {
        Self { kind, session }
    }
}
