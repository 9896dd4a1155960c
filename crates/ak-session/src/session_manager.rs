//! The session/profile reconciler.
//!
//! Owns the receiving end of the session-change channel and the published
//! `AuthState`. Reconciliation runs as asynchronous continuations; there
//! is no locking and no cancellation. A monotonic epoch taken at the start
//! of each session event guards publishing, so a slow reconciliation for a
//! superseded identity can never overwrite newer state (last write wins).

use crate::{AuthState, SessionError, SessionResult};

use ak_client::{AuthClient, Client};
use ak_core::{Identity, Profile, ProfileUpdate, mask_email, validate_email};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, error, info, warn};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

const MIN_PASSWORD_CHARS: usize = 6;

pub struct SessionManager {
    client: Arc<Client>,
    auth: Arc<AuthClient>,
    state_tx: watch::Sender<AuthState>,
    epoch: AtomicU64,
}

impl SessionManager {
    pub fn new(client: Arc<Client>, auth: Arc<AuthClient>) -> Self {
        let (state_tx, _) = watch::channel(AuthState::uninitialized());
        Self {
            client,
            auth,
            state_tx,
            epoch: AtomicU64::new(0),
        }
    }

    /// Observe the published `{identity, profile, loading}` state.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    /// Consume session-change events until the sender goes away.
    /// Events are processed in order; a lagged receiver logs and catches up.
    pub fn spawn_event_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        let mut events = self.auth.subscribe();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(change) => {
                        debug!("Session event: {}", change.kind.as_str());
                        let identity = change.session.map(|s| s.user);
                        manager.handle_session_event(identity).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("Session event stream lagged, {missed} events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Reconcile the published state with a backend-reported identity.
    ///
    /// Safe to call concurrently: each call takes the next epoch, and only
    /// the call holding the latest epoch gets to publish.
    pub async fn handle_session_event(&self, identity: Option<Identity>) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(identity) = identity else {
            self.publish_if_current(epoch, AuthState::signed_out());
            return;
        };

        self.publish_if_current(epoch, AuthState::loading(identity.clone()));
        let profile = self.reconcile(&identity).await;
        self.publish_if_current(epoch, AuthState::settled(identity, profile));
    }

    /// Re-run reconciliation for the current session, giving consumers a
    /// retry surface after a degraded (profile-less) outcome.
    pub async fn refresh_state(&self) {
        let identity = self.auth.current_session().map(|s| s.user);
        self.handle_session_event(identity).await;
    }

    /// Ensure a profile row exists and is loaded for the identity.
    /// `None` means degraded: authenticated without a usable profile.
    async fn reconcile(&self, identity: &Identity) -> Option<Profile> {
        match self.client.fetch_profile(identity.id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => self.create_profile(identity).await,
            Err(err) => {
                error!("Profile fetch failed for {}: {err}", identity.id);
                None
            }
        }
    }

    /// Insert the default row for a first sign-in. A concurrent creation
    /// for the same identity is non-fatal: the existing row wins.
    async fn create_profile(&self, identity: &Identity) -> Option<Profile> {
        let row = Profile::new(identity.id, identity.email.clone());

        match self.client.insert_profile(&row).await {
            Ok(created) => {
                info!("Created profile for {}", identity.id);
                Some(created)
            }
            Err(err) if err.is_unique_violation() => {
                info!("Profile already exists for {}, using existing row", identity.id);
                match self.client.fetch_profile(identity.id).await {
                    Ok(Some(existing)) => Some(self.backfill_email(identity, existing).await),
                    Ok(None) => None,
                    Err(err) => {
                        error!("Re-fetch after creation conflict failed: {err}");
                        None
                    }
                }
            }
            Err(err) => {
                error!("Profile creation failed for {}: {err}", identity.id);
                None
            }
        }
    }

    /// Rows created before the identity email was known get it copied in
    /// (with a refreshed update timestamp) before use.
    async fn backfill_email(&self, identity: &Identity, profile: Profile) -> Profile {
        if profile.email.is_some() {
            return profile;
        }
        let Some(email) = identity.email.as_deref() else {
            return profile;
        };

        match self.client.set_profile_email(profile.id, email).await {
            Ok(updated) => updated,
            Err(err) => {
                warn!("Email backfill failed for {}: {err}", profile.id);
                profile
            }
        }
    }

    fn publish_if_current(&self, epoch: u64, state: AuthState) {
        // the watch lock serializes check-and-write across tasks
        self.state_tx.send_modify(|current| {
            if self.epoch.load(Ordering::SeqCst) == epoch {
                *current = state;
            } else {
                debug!("Discarding stale reconciliation result (epoch {epoch})");
            }
        });
    }

    // =========================================================================
    // Operations exposed to the UI layer
    // =========================================================================

    /// Sign in with email + password. Profile loading rides the session
    /// event triggered by the backend, not this call.
    pub async fn sign_in(&self, email: &str, password: &str) -> SessionResult<()> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::validation("email and password are required"));
        }

        self.auth
            .sign_in(email, password)
            .await
            .map_err(SessionError::from_auth)?;

        Ok(())
    }

    /// Register an account. Validation failures are caught before any
    /// network call; backend failures pass through verbatim.
    pub async fn sign_up(&self, email: &str, password: &str) -> SessionResult<()> {
        let email = validate_email(email)
            .map_err(|_| SessionError::validation("a valid email address is required"))?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(SessionError::validation(
                "password must be at least 6 characters",
            ));
        }

        self.auth
            .sign_up(email, password)
            .await
            .map_err(SessionError::from_auth)?;

        Ok(())
    }

    /// Sign out and clear the published state synchronously, regardless of
    /// whether the backend call succeeded.
    pub async fn sign_out(&self) {
        self.auth.sign_out().await;
        self.handle_session_event(None).await;
    }

    /// Apply a partial profile edit. The backend's returned row - not the
    /// local buffer - replaces the published profile.
    pub async fn update_profile(&self, changes: ProfileUpdate) -> SessionResult<Profile> {
        let Some(identity) = self.state_tx.borrow().identity.clone() else {
            return Err(SessionError::unauthenticated());
        };
        if changes.is_empty() {
            return Err(SessionError::validation("no fields to update"));
        }

        match self.client.update_profile(identity.id, &changes).await {
            Ok(row) => {
                self.state_tx.send_modify(|state| {
                    if state.identity.as_ref().map(|i| i.id) == Some(row.id) {
                        state.profile = Some(row.clone());
                    }
                });
                Ok(row)
            }
            Err(err) => {
                error!("Profile update failed for {}: {err}", identity.id);
                Err(SessionError::update_failed())
            }
        }
    }

    /// Advisory nickname check: a race between check and save can still
    /// produce a uniqueness conflict at write time.
    pub async fn check_nickname_availability(&self, candidate: &str) -> SessionResult<bool> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(SessionError::validation("nickname is required"));
        }

        let exclude = self.state_tx.borrow().identity.as_ref().map(|i| i.id);

        match self.client.nickname_exists(candidate, exclude).await {
            Ok(exists) => Ok(!exists),
            Err(err) => {
                error!("Nickname availability check failed: {err}");
                Err(SessionError::lookup_failed())
            }
        }
    }

    /// Trigger the password-reset email flow.
    pub async fn reset_password(&self, email: &str) -> SessionResult<()> {
        let email = validate_email(email)
            .map_err(|_| SessionError::validation("a valid email address is required"))?;

        self.auth
            .send_password_reset(email)
            .await
            .map_err(SessionError::from_auth)?;

        Ok(())
    }

    /// Recover the account email for an exact name + phone match, masked
    /// for display. The failure is uniform: callers cannot tell a lookup
    /// error from a miss, or which field mismatched.
    pub async fn find_email_by_info(&self, name: &str, phone: &str) -> SessionResult<String> {
        let name = name.trim();
        let phone = phone.trim();

        match self.client.email_by_name_phone(name, phone).await {
            Ok(Some(email)) => Ok(mask_email(&email)),
            Ok(None) => Err(SessionError::no_matching_account()),
            Err(err) => {
                warn!("Account lookup failed: {err}");
                Err(SessionError::no_matching_account())
            }
        }
    }
}
