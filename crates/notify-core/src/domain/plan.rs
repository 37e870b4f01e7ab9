//! Subscription plan

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Plan used when registration does not name one
pub const DEFAULT_PLAN_ID: &str = "FREE";

/// Subscription tier: notification allowance per renewal period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Max sends per period
    pub notification_limit: u64,
    /// Period length in days
    pub period_days: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    /// Allowance left once `count` notifications have been sent
    pub fn remaining(&self, count: u64) -> u64 {
        self.notification_limit.saturating_sub(count)
    }

    /// Whether `count` already uses up the allowance
    pub fn is_exhausted(&self, count: u64) -> bool {
        count >= self.notification_limit
    }
}
