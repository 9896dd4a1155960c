use serde::{Deserialize, Serialize};

/// Kind of session-change notification emitted by the backend integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    /// Persisted session (or none) observed at process start
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

impl SessionEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::InitialSession => "initial_session",
            Self::SignedIn => "signed_in",
            Self::SignedOut => "signed_out",
            Self::TokenRefreshed => "token_refreshed",
        }
    }
}
