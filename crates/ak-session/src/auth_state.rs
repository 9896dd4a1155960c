use ak_core::{Identity, Profile};

/// The published auth/profile state observed by the UI layer.
///
/// Lifecycle: starts uninitialized (loading, nothing known), then settles
/// into signed-out or authenticated after each session event. An identity
/// without a profile is a legal degraded state - the UI prompts for
/// profile completion instead of treating it as fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
    pub loading: bool,
}

impl AuthState {
    /// Startup state: nothing known yet, reconciliation pending
    pub fn uninitialized() -> Self {
        Self {
            identity: None,
            profile: None,
            loading: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            identity: None,
            profile: None,
            loading: false,
        }
    }

    /// Reconciliation in flight for a known identity
    pub fn loading(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            profile: None,
            loading: true,
        }
    }

    /// Reconciliation finished; profile may be absent (degraded state)
    pub fn settled(identity: Identity, profile: Option<Profile>) -> Self {
        Self {
            identity: Some(identity),
            profile,
            loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn needs_profile_setup(&self) -> bool {
        self.identity.is_some() && !self.loading && self.profile.is_none()
    }
}
