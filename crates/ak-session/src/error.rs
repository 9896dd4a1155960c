use std::panic::Location;
use std::result::Result as StdResult;

use ak_client::ClientError;
use error_location::ErrorLocation;
use thiserror::Error;

/// Errors surfaced by the session operations.
///
/// Auth failures carry the backend's message verbatim; profile-store
/// failures are deliberately generic so schema detail never reaches the
/// user, and account lookup failures are uniform so a caller cannot tell
/// which field mismatched.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Sign-in required {location}")]
    Unauthenticated { location: ErrorLocation },

    #[error("Validation error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("{message} {location}")]
    Auth {
        message: String,
        location: ErrorLocation,
    },

    #[error("Profile update failed {location}")]
    UpdateFailed { location: ErrorLocation },

    #[error("Lookup failed {location}")]
    LookupFailed { location: ErrorLocation },

    #[error("No account matches the provided information {location}")]
    NoMatchingAccount { location: ErrorLocation },
}

impl SessionError {
    #[track_caller]
    pub fn unauthenticated() -> Self {
        SessionError::Unauthenticated {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn validation<S: Into<String>>(message: S) -> Self {
        SessionError::Validation {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn update_failed() -> Self {
        SessionError::UpdateFailed {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn lookup_failed() -> Self {
        SessionError::LookupFailed {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn no_matching_account() -> Self {
        SessionError::NoMatchingAccount {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Map an auth-endpoint failure, keeping the backend message verbatim
    /// when there is one.
    #[track_caller]
    pub fn from_auth(err: ClientError) -> Self {
        let message = err
            .backend_message()
            .map(String::from)
            .unwrap_or_else(|| "authentication request failed".to_string());

        SessionError::Auth {
            message,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type SessionResult<T> = StdResult<T, SessionError>;
