//! Profile-store endpoints over the `user_info` table.
//!
//! The table API uses `column=eq.value` filters and returns row sets;
//! point lookups are "unique-or-absent" - an empty result set is not an
//! error. Inserts and updates ask for the resulting row back
//! (`Prefer: return=representation`) so the stored row, not the local
//! buffer, is what callers end up holding.

use crate::{Client, ClientError, ClientResult};

use ak_core::{Profile, ProfileUpdate};

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TABLE_PATH: &str = "/rest/v1/user_info";

impl Client {
    /// Point lookup by identity id. Absence is not an error.
    pub async fn fetch_profile(&self, id: Uuid) -> ClientResult<Option<Profile>> {
        let req = self.request(Method::GET, TABLE_PATH).query(&[
            ("id", format!("eq.{id}")),
            ("select", "*".to_string()),
            ("limit", "1".to_string()),
        ]);
        let value = self.execute(req).await?;
        let mut rows: Vec<Profile> = serde_json::from_value(value)?;

        Ok(rows.pop())
    }

    /// Insert a profile row, returning the stored representation.
    /// Duplicate keys surface as a conflict (`is_unique_violation`).
    pub async fn insert_profile(&self, row: &Profile) -> ClientResult<Profile> {
        let req = self
            .request(Method::POST, TABLE_PATH)
            .header("Prefer", "return=representation")
            .json(row);
        let value = self.execute(req).await?;

        single_row(value)
    }

    /// Apply a partial update plus a refreshed update timestamp.
    pub async fn update_profile(&self, id: Uuid, changes: &ProfileUpdate) -> ClientResult<Profile> {
        #[derive(Serialize)]
        struct UpdateRow<'a> {
            #[serde(flatten)]
            changes: &'a ProfileUpdate,
            update_at: DateTime<Utc>,
        }

        let body = UpdateRow {
            changes,
            update_at: Utc::now(),
        };
        let req = self
            .request(Method::PATCH, TABLE_PATH)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&body);
        let value = self.execute(req).await?;

        single_row(value)
    }

    /// Backfill the denormalized email on a row created before the identity
    /// email was known.
    pub async fn set_profile_email(&self, id: Uuid, email: &str) -> ClientResult<Profile> {
        #[derive(Serialize)]
        struct EmailRow<'a> {
            email: &'a str,
            update_at: DateTime<Utc>,
        }

        let body = EmailRow {
            email,
            update_at: Utc::now(),
        };
        let req = self
            .request(Method::PATCH, TABLE_PATH)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&body);
        let value = self.execute(req).await?;

        single_row(value)
    }

    /// True when another profile already uses the nickname (exact match,
    /// excluding the caller's own row when an id is supplied).
    pub async fn nickname_exists(
        &self,
        nickname: &str,
        exclude: Option<Uuid>,
    ) -> ClientResult<bool> {
        let mut params = vec![
            ("nick_name".to_string(), format!("eq.{nickname}")),
            ("select".to_string(), "id".to_string()),
        ];
        if let Some(id) = exclude {
            params.push(("id".to_string(), format!("neq.{id}")));
        }

        let req = self.request(Method::GET, TABLE_PATH).query(&params);
        let value = self.execute(req).await?;
        let rows = value.as_array().map(Vec::len).unwrap_or(0);

        Ok(rows > 0)
    }

    /// Stored email for an exact name + phone match, if any row matches.
    pub async fn email_by_name_phone(
        &self,
        name: &str,
        phone: &str,
    ) -> ClientResult<Option<String>> {
        #[derive(Deserialize)]
        struct EmailRow {
            email: Option<String>,
        }

        let req = self.request(Method::GET, TABLE_PATH).query(&[
            ("name", format!("eq.{name}")),
            ("phone", format!("eq.{phone}")),
            ("select", "email".to_string()),
            ("limit", "1".to_string()),
        ]);
        let value = self.execute(req).await?;
        let mut rows: Vec<EmailRow> = serde_json::from_value(value)?;

        Ok(rows.pop().and_then(|row| row.email))
    }
}

/// Representation responses are row sets; a write that matched nothing
/// comes back empty.
fn single_row(value: serde_json::Value) -> ClientResult<Profile> {
    let mut rows: Vec<Profile> = serde_json::from_value(value)?;

    rows.pop()
        .ok_or_else(|| ClientError::api("PGRST116", "no rows returned"))
}
