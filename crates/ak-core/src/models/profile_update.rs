use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Partial-field profile edit. Absent fields are left untouched by the
/// backend; the stored row returned from the update is the source of truth,
/// never this buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_day: Option<NaiveDate>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.nick_name.is_none()
            && self.phone.is_none()
            && self.birth_day.is_none()
    }
}
