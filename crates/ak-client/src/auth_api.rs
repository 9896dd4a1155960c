//! Credential-based auth endpoints.
//!
//! Failure messages from these endpoints are backend-authored and pass
//! through verbatim; callers surface them to the user unchanged.

use crate::{Client, ClientResult};

use ak_core::Session;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

impl Client {
    /// Exchange email + password for a session
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session> {
        #[derive(Serialize)]
        struct PasswordGrant<'a> {
            email: &'a str,
            password: &'a str,
        }

        let body = PasswordGrant { email, password };
        let req = self
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&body);
        let value = self.execute(req).await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Register a new account.
    ///
    /// Returns the session when the backend signs the user in immediately;
    /// `None` when a confirmation step (e.g. email verification) is pending.
    pub async fn sign_up(&self, email: &str, password: &str) -> ClientResult<Option<Session>> {
        #[derive(Serialize)]
        struct SignUpRequest<'a> {
            email: &'a str,
            password: &'a str,
        }

        let body = SignUpRequest { email, password };
        let req = self.request(Method::POST, "/auth/v1/signup").json(&body);
        let value = self.execute(req).await?;

        Ok(extract_session(value))
    }

    /// Revoke the current session on the backend
    pub async fn sign_out(&self) -> ClientResult<()> {
        let req = self.request(Method::POST, "/auth/v1/logout");
        self.execute(req).await?;

        Ok(())
    }

    /// Trigger the password-reset email flow
    pub async fn send_password_reset(&self, email: &str, redirect_to: &str) -> ClientResult<()> {
        #[derive(Serialize)]
        struct RecoverRequest<'a> {
            email: &'a str,
        }

        let body = RecoverRequest { email };
        let req = self
            .request(Method::POST, "/auth/v1/recover")
            .query(&[("redirect_to", redirect_to)])
            .json(&body);
        self.execute(req).await?;

        Ok(())
    }

    /// Exchange a refresh token for a fresh session
    pub async fn refresh_session(&self, refresh_token: &str) -> ClientResult<Session> {
        #[derive(Serialize)]
        struct RefreshGrant<'a> {
            refresh_token: &'a str,
        }

        let body = RefreshGrant { refresh_token };
        let req = self
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "refresh_token")])
            .json(&body);
        let value = self.execute(req).await?;

        Ok(serde_json::from_value(value)?)
    }
}

/// Sign-up responses carry the session either at the top level or nested,
/// depending on whether confirmation is required.
fn extract_session(value: Value) -> Option<Session> {
    if value.get("access_token").is_some() {
        return serde_json::from_value(value).ok();
    }

    value
        .get("session")
        .filter(|s| s.is_object())
        .and_then(|s| serde_json::from_value(s.clone()).ok())
}
