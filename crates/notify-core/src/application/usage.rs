//! Usage period tracking
//!
//! Per business, the newest period record is either current or expired.
//! Expired periods are rolled over lazily on first access: the old record
//! gets a `retiredAt` stamp and a fresh period with a zero counter is
//! written, both in one transaction. The `retiredAt` condition makes
//! concurrent rollovers converge on a single new period; a business's first
//! period claims the `USAGE_GENESIS` marker the same way.

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use super::keys;
use crate::domain::usage::USAGE_SORT_PREFIX;
use crate::domain::value_objects::BusinessId;
use crate::domain::UsagePeriod;
use crate::error::{NotifyError, NotifyResult};
use crate::ports::outbound::{
    Clock, Condition, Item, KeyValueStore, Query, StoreError, UpdateSpec, WriteOp,
};

const COUNT_ATTR: &str = "notificationCount";

/// Usage period state machine
#[derive(Clone)]
pub struct UsagePeriodTracker {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl UsagePeriodTracker {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Most recent period (highest start) for the business
    pub async fn get_current_usage(&self, business_id: &BusinessId) -> NotifyResult<UsagePeriod> {
        self.latest(business_id)
            .await?
            .ok_or_else(|| NotifyError::NotFound("usage period".into()))
    }

    /// Write period 0 for a freshly registered business
    pub async fn open_initial_period(
        &self,
        business_id: &BusinessId,
        plan_id: &str,
        period_days: u32,
    ) -> NotifyResult<UsagePeriod> {
        self.open(business_id, plan_id, period_days, None).await
    }

    /// Current period, rolling over if the newest one has expired.
    ///
    /// Repeated calls within a still-valid period return the same record.
    pub async fn check_and_rollover(
        &self,
        business_id: &BusinessId,
        plan_id: &str,
        period_days: u32,
    ) -> NotifyResult<UsagePeriod> {
        let latest = self.latest(business_id).await?;

        if let Some(current) = latest.as_ref().filter(|p| p.is_current(self.clock.now())) {
            debug!(business_id = %business_id, period = %current.sort_key(), "reusing current period");
            return Ok(current.clone());
        }

        self.open(business_id, plan_id, period_days, latest.as_ref()).await
    }

    /// Open a fresh period, retiring `expired` in the same transaction.
    ///
    /// Period keys carry the start instant, so two first periods would not
    /// collide on their own; without an expired period to retire, the
    /// genesis marker is claimed instead.
    async fn open(
        &self,
        business_id: &BusinessId,
        plan_id: &str,
        period_days: u32,
        expired: Option<&UsagePeriod>,
    ) -> NotifyResult<UsagePeriod> {
        let now = self.clock.now();
        let fresh = UsagePeriod::open(business_id.clone(), plan_id, now, period_days);

        let guard = match expired {
            Some(expired) => WriteOp::Update {
                key: keys::usage_period(business_id, &expired.sort_key()),
                update: UpdateSpec::new().set("retiredAt", json!(now)),
                condition: Some(Condition::AttributeAbsent("retiredAt".into())),
            },
            None => WriteOp::put_if_absent(Item::from_record(
                keys::usage_genesis(business_id),
                &json!({ "businessId": business_id.to_string(), "firstPeriod": fresh.sort_key() }),
            )?),
        };

        match self
            .store
            .transact_write(vec![WriteOp::put_if_absent(self.period_item(&fresh)?), guard])
            .await
        {
            Ok(()) => {
                info!(
                    business_id = %business_id,
                    period = %fresh.sort_key(),
                    retired = expired.is_some(),
                    "usage period opened"
                );
                Ok(fresh)
            }
            Err(StoreError::ConditionFailed { .. }) => {
                // Another request opened the period first; take its record.
                debug!(business_id = %business_id, "concurrent period open, re-reading period");
                self.get_current_usage(business_id).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Atomic add-one on the period counter, refused once `ceiling` is reached.
    ///
    /// Returns the new count.
    pub async fn increment(
        &self,
        business_id: &BusinessId,
        period_sort_key: &str,
        ceiling: u64,
    ) -> NotifyResult<u64> {
        let bound = i64::try_from(ceiling).unwrap_or(i64::MAX);
        let item = self
            .store
            .update(
                &keys::usage_period(business_id, period_sort_key),
                UpdateSpec::new()
                    .add(COUNT_ATTR, 1)
                    .set("updatedAt", json!(self.clock.now())),
                Some(Condition::below(COUNT_ATTR, bound)),
            )
            .await?;

        Ok(item
            .attributes
            .get(COUNT_ATTR)
            .and_then(|v| v.as_u64())
            .unwrap_or_default())
    }

    async fn latest(&self, business_id: &BusinessId) -> NotifyResult<Option<UsagePeriod>> {
        let query = Query::partition(keys::business_pk(business_id))
            .with_prefix(USAGE_SORT_PREFIX)
            .newest_first()
            .limit(1);

        match self.store.query(query).await?.first() {
            Some(item) => Ok(Some(item.to_record()?)),
            None => Ok(None),
        }
    }

    fn period_item(&self, period: &UsagePeriod) -> NotifyResult<Item> {
        Ok(Item::from_record(
            keys::usage_period(&period.business_id, &period.sort_key()),
            period,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::infrastructure::mocks::MockClock;
    use crate::infrastructure::InMemoryStore;
    use crate::ports::outbound::ItemKey;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Barrier;

    fn tracker() -> (Arc<InMemoryStore>, Arc<MockClock>, UsagePeriodTracker) {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(MockClock::default());
        let tracker = UsagePeriodTracker::new(store.clone(), clock.clone());
        (store, clock, tracker)
    }

    fn id() -> BusinessId {
        BusinessId::from_string("b1")
    }

    async fn periods(store: &InMemoryStore) -> Vec<UsagePeriod> {
        let query = Query::partition(keys::business_pk(&id())).with_prefix(USAGE_SORT_PREFIX);
        store
            .query(query)
            .await
            .unwrap()
            .iter()
            .map(|item| item.to_record().unwrap())
            .collect()
    }

    /// Holds the first `gated` queries at a barrier, so concurrent openers
    /// all read the partition before any of them writes.
    struct BarrierStore {
        inner: Arc<InMemoryStore>,
        barrier: Barrier,
        gated: AtomicUsize,
    }

    impl BarrierStore {
        fn new(inner: Arc<InMemoryStore>, parties: usize) -> Self {
            Self { inner, barrier: Barrier::new(parties), gated: AtomicUsize::new(parties) }
        }
    }

    #[async_trait]
    impl KeyValueStore for BarrierStore {
        async fn get(&self, key: &ItemKey) -> Result<Option<Item>, StoreError> {
            self.inner.get(key).await
        }

        async fn put(&self, item: Item, condition: Option<Condition>) -> Result<(), StoreError> {
            self.inner.put(item, condition).await
        }

        async fn update(
            &self,
            key: &ItemKey,
            update: UpdateSpec,
            condition: Option<Condition>,
        ) -> Result<Item, StoreError> {
            self.inner.update(key, update, condition).await
        }

        async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
            self.inner.transact_write(ops).await
        }

        async fn query(&self, query: Query) -> Result<Vec<Item>, StoreError> {
            let items = self.inner.query(query).await?;
            let held = self
                .gated
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if held {
                self.barrier.wait().await;
            }
            Ok(items)
        }
    }

    #[tokio::test]
    async fn test_no_period_is_not_found() {
        let (_, _, tracker) = tracker();
        let err = tracker.get_current_usage(&id()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rollover_is_idempotent_within_period() {
        let (store, clock, tracker) = tracker();
        let first = tracker.check_and_rollover(&id(), "FREE", 30).await.unwrap();
        clock.advance(Duration::days(10));
        let second = tracker.check_and_rollover(&id(), "FREE", 30).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(periods(&store).await.len(), 1);
    }

    #[tokio::test]
    async fn test_rollover_after_expiry_opens_one_fresh_period() {
        let (store, clock, tracker) = tracker();
        let first = tracker.open_initial_period(&id(), "FREE", 30).await.unwrap();
        tracker.increment(&id(), &first.sort_key(), 5).await.unwrap();

        clock.advance(Duration::days(30));
        let fresh = tracker.check_and_rollover(&id(), "FREE", 30).await.unwrap();
        assert_ne!(fresh.sort_key(), first.sort_key());
        assert_eq!(fresh.notification_count, 0);
        assert_eq!(fresh.period_start, clock.now());
        assert_eq!(periods(&store).await.len(), 2);

        let again = tracker.check_and_rollover(&id(), "FREE", 30).await.unwrap();
        assert_eq!(again, fresh);
        assert_eq!(periods(&store).await.len(), 2);

        let retired: UsagePeriod = store
            .get(&keys::usage_period(&id(), &first.sort_key()))
            .await
            .unwrap()
            .unwrap()
            .to_record()
            .unwrap();
        assert_eq!(retired.notification_count, 1);
        assert!(retired.retired_at.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_rollovers_converge() {
        let (store, clock, tracker) = tracker();
        tracker.open_initial_period(&id(), "FREE", 30).await.unwrap();
        clock.advance(Duration::days(31));

        let mut handles = Vec::new();
        for i in 0..8 {
            let tracker = tracker.clone();
            let clock = clock.clone();
            handles.push(tokio::spawn(async move {
                clock.advance(Duration::microseconds(i));
                tracker.check_and_rollover(&id(), "FREE", 30).await
            }));
        }

        let mut opened = Vec::new();
        for handle in handles {
            opened.push(handle.await.unwrap().unwrap().sort_key());
        }
        opened.dedup();
        assert_eq!(opened.len(), 1);
        assert_eq!(periods(&store).await.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_periods_converge() {
        let store = Arc::new(InMemoryStore::new());
        let gated = Arc::new(BarrierStore::new(store.clone(), 2));

        let start = MockClock::default().now();
        let early = UsagePeriodTracker::new(gated.clone(), Arc::new(MockClock::new(start)));
        let late = UsagePeriodTracker::new(
            gated.clone(),
            Arc::new(MockClock::new(start + Duration::microseconds(1))),
        );

        let (a, b) = tokio::join!(
            tokio::spawn(async move { early.check_and_rollover(&id(), "FREE", 30).await }),
            tokio::spawn(async move { late.check_and_rollover(&id(), "FREE", 30).await }),
        );
        let (a, b) = (a.unwrap().unwrap(), b.unwrap().unwrap());

        assert_eq!(a.sort_key(), b.sort_key());
        let stored = periods(&store).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.iter().filter(|p| p.retired_at.is_none()).count(), 1);
    }

    #[tokio::test]
    async fn test_initial_period_blocks_second_first_period() {
        let (store, clock, tracker) = tracker();
        let initial = tracker.open_initial_period(&id(), "FREE", 30).await.unwrap();

        clock.advance(Duration::microseconds(5));
        let again = tracker.open_initial_period(&id(), "FREE", 30).await.unwrap();

        assert_eq!(again, initial);
        assert_eq!(periods(&store).await.len(), 1);
    }

    #[tokio::test]
    async fn test_increment_stops_at_ceiling() {
        let (_, _, tracker) = tracker();
        let period = tracker.open_initial_period(&id(), "FREE", 30).await.unwrap();
        let key = period.sort_key();

        assert_eq!(tracker.increment(&id(), &key, 2).await.unwrap(), 1);
        assert_eq!(tracker.increment(&id(), &key, 2).await.unwrap(), 2);
        let err = tracker.increment(&id(), &key, 2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);

        let current = tracker.get_current_usage(&id()).await.unwrap();
        assert_eq!(current.notification_count, 2);
        assert!(current.updated_at.is_some());
    }
}
