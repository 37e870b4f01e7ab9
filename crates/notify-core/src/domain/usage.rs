//! Usage periods
//!
//! A period is either current (end in the future) or expired. Expired
//! periods are never reopened: they get a `retired_at` stamp and a new
//! period with a zero counter replaces them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::BusinessId;

/// Sort-key namespace of usage periods inside a business partition
pub const USAGE_SORT_PREFIX: &str = "USAGE#";

/// Accounting window for one business.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagePeriod {
    pub business_id: BusinessId,
    pub plan_id: String,
    #[serde(default)]
    pub notification_count: u64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retired_at: Option<DateTime<Utc>>,
}

impl UsagePeriod {
    /// Open a period starting at `now` with a zero counter
    pub fn open(
        business_id: BusinessId,
        plan_id: impl Into<String>,
        now: DateTime<Utc>,
        period_days: u32,
    ) -> Self {
        Self {
            business_id,
            plan_id: plan_id.into(),
            notification_count: 0,
            period_start: now,
            period_end: now + Duration::days(i64::from(period_days)),
            created_at: now,
            updated_at: None,
            retired_at: None,
        }
    }

    /// Whether the period is still accepting usage at `now`
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        now < self.period_end
    }

    /// Sort key of this period; orders lexicographically by start time
    pub fn sort_key(&self) -> String {
        Self::sort_key_for(self.period_start)
    }

    /// Sort key for a period starting at `start`
    pub fn sort_key_for(start: DateTime<Utc>) -> String {
        format!("{}{}", USAGE_SORT_PREFIX, start.format("%Y-%m-%dT%H:%M:%S%.6fZ"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_open_period() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let period = UsagePeriod::open(BusinessId::from_string("b1"), "FREE", now, 30);
        assert_eq!(period.notification_count, 0);
        assert_eq!(period.period_end, Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap());
        assert!(period.is_current(now));
        assert!(!period.is_current(period.period_end));
    }

    #[test]
    fn test_sort_keys_order_by_start() {
        let a = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let b = a + Duration::microseconds(1);
        let c = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
        let keys = [
            UsagePeriod::sort_key_for(a),
            UsagePeriod::sort_key_for(b),
            UsagePeriod::sort_key_for(c),
        ];
        assert!(keys[0] < keys[1] && keys[1] < keys[2]);
        assert!(keys[0].starts_with(USAGE_SORT_PREFIX));
    }

    #[test]
    fn test_zero_day_period_is_never_current() {
        let now = Utc::now();
        let period = UsagePeriod::open(BusinessId::from_string("b1"), "FREE", now, 0);
        assert!(!period.is_current(now));
    }
}
