//! Catalog fixtures for tests.

use chrono::{TimeZone, Utc};

use crate::domain::{Channel, Plan, Template};

/// Active plan with the given allowance
pub fn plan(id: &str, notification_limit: u64, period_days: u32) -> Plan {
    Plan {
        id: id.to_string(),
        name: format!("{} plan", id),
        notification_limit,
        period_days,
        price: 0.0,
        description: String::new(),
        active: true,
        created_at: Utc.timestamp_opt(0, 0).single().unwrap_or_default(),
    }
}

/// Active template; the name mirrors the id and the content id is `HX-<id>`
pub fn template(id: &str, channel: Channel, parameters: &[&str], body: &str) -> Template {
    Template {
        id: id.to_string(),
        name: id.to_string(),
        channel,
        provider: "test".to_string(),
        external_id: format!("HX-{}", id),
        parameters: parameters.iter().map(|p| p.to_string()).collect(),
        description: body.to_string(),
        active: true,
        created_at: Utc.timestamp_opt(0, 0).single().unwrap_or_default(),
    }
}
