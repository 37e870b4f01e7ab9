//! Quota gate
//!
//! Plan lookup plus period rollover, producing an allow/deny decision. The
//! check before dispatch is read-then-act; the increment after dispatch is
//! conditional on the limit, so the stored count never passes it even when
//! concurrent sends for one business overshoot actual deliveries.

use tracing::{debug, warn};

use super::plans::PlanCatalog;
use super::usage::UsagePeriodTracker;
use crate::domain::{Business, Plan, UsagePeriod};
use crate::error::{ErrorKind, NotifyError, NotifyResult};

/// Admission granted for one send
#[derive(Clone, Debug, PartialEq)]
pub struct QuotaTicket {
    pub plan: Plan,
    pub period: UsagePeriod,
}

impl QuotaTicket {
    /// Count reported once this send is recorded
    pub fn count_after_send(&self) -> u64 {
        self.period.notification_count + 1
    }

    /// `max(0, limit - (count + 1))`
    pub fn remaining_after_send(&self) -> u64 {
        self.plan.remaining(self.count_after_send())
    }
}

/// Allow/deny decision over plan and current period
#[derive(Clone)]
pub struct QuotaGate {
    plans: PlanCatalog,
    usage: UsagePeriodTracker,
}

impl QuotaGate {
    pub fn new(plans: PlanCatalog, usage: UsagePeriodTracker) -> Self {
        Self { plans, usage }
    }

    /// Plan and current period for a business, rolling over if needed
    pub async fn snapshot(&self, business: &Business) -> NotifyResult<(Plan, UsagePeriod)> {
        let plan = match self.plans.get_by_id(&business.plan_id).await {
            Ok(plan) => plan,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(business_id = %business.id, plan_id = %business.plan_id, "business references unknown plan");
                return Err(NotifyError::ServiceUnavailable("plan configuration".into()));
            }
            Err(e) => return Err(e),
        };

        let period = self
            .usage
            .check_and_rollover(&business.id, &plan.id, plan.period_days)
            .await?;
        Ok((plan, period))
    }

    /// Admit one send or fail with `QuotaExceeded`
    pub async fn admit(&self, business: &Business) -> NotifyResult<QuotaTicket> {
        let (plan, period) = self.snapshot(business).await?;

        if plan.is_exhausted(period.notification_count) {
            warn!(
                business_id = %business.id,
                limit = plan.notification_limit,
                count = period.notification_count,
                "notification limit reached"
            );
            return Err(NotifyError::QuotaExceeded { limit: plan.notification_limit });
        }

        Ok(QuotaTicket { plan, period })
    }

    /// Count a completed send. Failures are logged and swallowed: the
    /// message is already out.
    pub async fn record_send(&self, ticket: &QuotaTicket) {
        let business_id = &ticket.period.business_id;
        match self
            .usage
            .increment(business_id, &ticket.period.sort_key(), ticket.plan.notification_limit)
            .await
        {
            Ok(count) => debug!(business_id = %business_id, count, "usage incremented"),
            Err(e) => warn!(
                business_id = %business_id,
                period = %ticket.period.sort_key(),
                error = %e,
                "usage increment failed after send; usage may under-count or the limit was overshot"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Email, Phone};
    use crate::infrastructure::mocks::{fixtures, FailingStore, MockClock, StoreOp};
    use crate::infrastructure::{seed_plans, InMemoryStore};
    use crate::ports::outbound::{Clock, KeyValueStore};
    use std::sync::Arc;

    async fn gate_over(store: Arc<dyn KeyValueStore>, limit: u64) -> (QuotaGate, Business) {
        seed_plans(store.as_ref(), &[fixtures::plan("FREE", limit, 30)]).await.unwrap();
        let clock: Arc<dyn Clock> = Arc::new(MockClock::default());
        let gate = QuotaGate::new(
            PlanCatalog::new(store.clone()),
            UsagePeriodTracker::new(store, clock.clone()),
        );
        let business = Business::register(
            "Acme",
            Email::new("a@x.com").unwrap(),
            Phone::parse("+15551234567").unwrap(),
            "FREE",
            clock.now(),
        );
        (gate, business)
    }

    #[tokio::test]
    async fn test_admit_until_exhausted() {
        let (gate, business) = gate_over(Arc::new(InMemoryStore::new()), 2).await;

        let ticket = gate.admit(&business).await.unwrap();
        assert_eq!(ticket.count_after_send(), 1);
        assert_eq!(ticket.remaining_after_send(), 1);
        gate.record_send(&ticket).await;

        let ticket = gate.admit(&business).await.unwrap();
        assert_eq!(ticket.remaining_after_send(), 0);
        gate.record_send(&ticket).await;

        let err = gate.admit(&business).await.unwrap_err();
        assert_eq!(err, NotifyError::QuotaExceeded { limit: 2 });
    }

    #[tokio::test]
    async fn test_zero_limit_plan_denies_first_send() {
        let (gate, business) = gate_over(Arc::new(InMemoryStore::new()), 0).await;
        assert_eq!(gate.admit(&business).await.unwrap_err().kind(), ErrorKind::QuotaExceeded);
    }

    #[tokio::test]
    async fn test_unknown_plan_is_service_unavailable() {
        let (gate, mut business) = gate_over(Arc::new(InMemoryStore::new()), 5).await;
        business.plan_id = "GONE".into();
        let err = gate.admit(&business).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_record_send_swallows_store_failure() {
        let store = Arc::new(FailingStore::new(Arc::new(InMemoryStore::new())));
        let (gate, business) = gate_over(store.clone(), 5).await;

        let ticket = gate.admit(&business).await.unwrap();
        store.fail_on(StoreOp::Update);
        gate.record_send(&ticket).await;

        store.recover();
        let (_, period) = gate.snapshot(&business).await.unwrap();
        assert_eq!(period.notification_count, 0);
    }
}
