//! Session lifecycle over the raw auth endpoints.
//!
//! `AuthClient` owns the current session, its persistence, and the sending
//! end of the session-change channel. The reconciler subscribes and reacts;
//! it never mutates session state directly.

use crate::{Client, ClientError, ClientResult, SessionStore};

use ak_core::{Session, SessionChange, SessionEventKind};

use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

pub struct AuthClient {
    client: Arc<Client>,
    store: SessionStore,
    current: Mutex<Option<Session>>,
    events: broadcast::Sender<SessionChange>,
}

impl AuthClient {
    pub fn new(client: Arc<Client>, store: SessionStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            client,
            store,
            current: Mutex::new(None),
            events,
        }
    }

    /// Subscribe to session changes. Every sign-in, sign-out, refresh and
    /// the startup session report arrives here.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.current.lock().clone()
    }

    /// Report the persisted session (or none) once at process start.
    pub fn initialize(&self) -> ClientResult<Option<Session>> {
        let session = self.store.load()?;

        if let Some(s) = &session {
            self.client.set_bearer(Some(s.access_token.clone()));
        }
        *self.current.lock() = session.clone();
        self.emit(SessionEventKind::InitialSession, session.clone());

        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<Session> {
        let session = self.client.sign_in_with_password(email, password).await?;

        self.install(&session);
        self.emit(SessionEventKind::SignedIn, Some(session.clone()));
        info!("Signed in as {}", session.user.id);

        Ok(session)
    }

    /// Register an account. Emits a sign-in event only when the backend
    /// opened a session immediately (no confirmation step pending).
    pub async fn sign_up(&self, email: &str, password: &str) -> ClientResult<Option<Session>> {
        let session = self.client.sign_up(email, password).await?;

        if let Some(s) = &session {
            self.install(s);
            self.emit(SessionEventKind::SignedIn, Some(s.clone()));
        }

        Ok(session)
    }

    /// Sign out: best-effort backend revocation, unconditional local clear.
    /// A failed backend call is logged, never surfaced.
    pub async fn sign_out(&self) {
        if let Err(err) = self.client.sign_out().await {
            warn!("Backend sign-out failed, clearing local session anyway: {err}");
        }

        self.client.set_bearer(None);
        *self.current.lock() = None;
        if let Err(err) = self.store.clear() {
            warn!("Failed to remove persisted session: {err}");
        }
        self.emit(SessionEventKind::SignedOut, None);
    }

    /// Password-reset email with the app's fixed callback target.
    pub async fn send_password_reset(&self, email: &str) -> ClientResult<()> {
        let redirect = format!("{}/auth/callback", self.client.base_url());
        self.client.send_password_reset(email, &redirect).await
    }

    /// Exchange the current refresh token for a fresh session.
    pub async fn refresh_session(&self) -> ClientResult<Session> {
        let refresh_token = self
            .current
            .lock()
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or_else(|| ClientError::api("no_session", "no active session to refresh"))?;

        let session = self.client.refresh_session(&refresh_token).await?;
        self.install(&session);
        self.emit(SessionEventKind::TokenRefreshed, Some(session.clone()));

        Ok(session)
    }

    fn install(&self, session: &Session) {
        self.client.set_bearer(Some(session.access_token.clone()));
        *self.current.lock() = Some(session.clone());
        if let Err(err) = self.store.save(session) {
            warn!("Failed to persist session: {err}");
        }
    }

    fn emit(&self, kind: SessionEventKind, session: Option<Session>) {
        // send only fails when no receiver is subscribed yet
        let _ = self.events.send(SessionChange::new(kind, session));
    }
}
