//! Email shape check used before any network call.

use crate::{CoreError, CoreResult};

use std::panic::Location;

use error_location::ErrorLocation;

/// Trim and shape-check an email address (`something@something`).
///
/// Real validation is the backend's job; this only catches obviously
/// malformed input before a round trip.
#[track_caller]
pub fn validate_email(input: &str) -> CoreResult<&str> {
    let trimmed = input.trim();
    let well_formed = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());

    if well_formed {
        Ok(trimmed)
    } else {
        Err(CoreError::InvalidEmail {
            value: trimmed.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
