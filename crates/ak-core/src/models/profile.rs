//! Profile - the application-owned record keyed 1:1 by identity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user profile row in the remote `user_info` table.
///
/// The row is created lazily on first sign-in and updated only through
/// explicit edits. `email` is a denormalized copy of the identity email
/// taken at creation time; it is not kept in sync with later changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: Option<String>,
    pub nick_name: Option<String>,
    pub phone: Option<String>,
    pub birth_day: Option<NaiveDate>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    /// The `user_info` table spells this column `update_at`
    #[serde(rename = "update_at")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Build the default row inserted at first sign-in: every user-supplied
    /// field empty, email copied from the identity.
    pub fn new(id: Uuid, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: None,
            nick_name: None,
            phone: None,
            birth_day: None,
            email,
            created_at: now,
            updated_at: Some(now),
        }
    }

    /// A profile is complete once the user has picked a nickname.
    pub fn is_complete(&self) -> bool {
        self.nick_name.is_some()
    }
}
