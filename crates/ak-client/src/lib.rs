//! HTTP client for the hosted auth + profile-store backend.
//!
//! `Client` speaks the backend's REST surface (auth endpoints and the
//! `user_info` table); `AuthClient` layers session lifecycle, local
//! persistence and the session-change broadcast on top of it.

pub mod auth_api;
pub mod auth_client;
pub mod error;
pub mod http;
pub mod profiles;
pub mod session_store;

pub use auth_client::AuthClient;
pub use error::{ClientError, ClientResult};
pub use http::Client;
pub use session_store::SessionStore;
