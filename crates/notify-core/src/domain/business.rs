//! Business (tenant) entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{ApiKey, BusinessId, Email, Phone};

/// Tenant account.
///
/// Email, phone and API key are each unique across all businesses; the
/// directory enforces that through index records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub plan_id: String,
    pub api_key: ApiKey,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Business {
    /// Fresh business with a generated id and API key
    pub fn register(
        name: impl Into<String>,
        email: Email,
        phone: Phone,
        plan_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BusinessId::generate(),
            name: name.into(),
            email,
            phone,
            plan_id: plan_id.into(),
            api_key: ApiKey::generate(),
            created_at: now,
            updated_at: None,
        }
    }

    /// Whether the supplied identity attributes match this business
    pub fn owns(&self, email: &Email, phone: &Phone) -> bool {
        &self.email == email && &self.phone == phone
    }
}
