//! Store wrapper that fails on demand.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::ports::outbound::{
    Condition, Item, ItemKey, KeyValueStore, Query, StoreError, UpdateSpec, WriteOp,
};

/// Store operation selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Put,
    Update,
    Transaction,
    Query,
}

/// Delegates to an inner store unless the operation is set to fail
pub struct FailingStore {
    inner: Arc<dyn KeyValueStore>,
    failing: Mutex<HashSet<StoreOp>>,
}

impl FailingStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner, failing: Mutex::new(HashSet::new()) }
    }

    /// Make `op` fail with `Unavailable` until [`FailingStore::recover`]
    pub fn fail_on(&self, op: StoreOp) {
        self.failing.lock().insert(op);
    }

    pub fn recover(&self) {
        self.failing.lock().clear();
    }

    fn guard(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.failing.lock().contains(&op) {
            return Err(StoreError::Unavailable(format!("{:?} disabled by test", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &ItemKey) -> Result<Option<Item>, StoreError> {
        self.guard(StoreOp::Get)?;
        self.inner.get(key).await
    }

    async fn put(&self, item: Item, condition: Option<Condition>) -> Result<(), StoreError> {
        self.guard(StoreOp::Put)?;
        self.inner.put(item, condition).await
    }

    async fn update(
        &self,
        key: &ItemKey,
        update: UpdateSpec,
        condition: Option<Condition>,
    ) -> Result<Item, StoreError> {
        self.guard(StoreOp::Update)?;
        self.inner.update(key, update, condition).await
    }

    async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        self.guard(StoreOp::Transaction)?;
        self.inner.transact_write(ops).await
    }

    async fn query(&self, query: Query) -> Result<Vec<Item>, StoreError> {
        self.guard(StoreOp::Query)?;
        self.inner.query(query).await
    }
}
