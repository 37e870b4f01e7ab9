//! In-memory key-value store
//!
//! Ordered map behind a single lock. Transactions validate every condition
//! under the write lock before applying anything, which gives the same
//! all-or-nothing semantics as a transactional backend.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::ports::outbound::{
    Attributes, Condition, Item, ItemKey, KeyValueStore, Query, StoreError, UpdateSpec, WriteOp,
};

/// In-memory store (single process, tests and local runs)
#[derive(Clone, Default)]
pub struct InMemoryStore {
    items: Arc<RwLock<BTreeMap<ItemKey, Attributes>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

fn check(condition: Option<&Condition>, current: Option<&Attributes>, op_index: usize) -> Result<(), StoreError> {
    match condition {
        Some(c) if !c.evaluate(current) => Err(StoreError::ConditionFailed { op_index }),
        _ => Ok(()),
    }
}

fn updated(current: Option<&Attributes>, update: &UpdateSpec, op_index: usize) -> Result<Attributes, StoreError> {
    let mut attrs = current
        .cloned()
        .ok_or(StoreError::ConditionFailed { op_index })?;
    update.apply(&mut attrs)?;
    Ok(attrs)
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &ItemKey) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().get(key).map(|attributes| Item {
            key: key.clone(),
            attributes: attributes.clone(),
        }))
    }

    async fn put(&self, item: Item, condition: Option<Condition>) -> Result<(), StoreError> {
        let mut items = self.items.write();
        check(condition.as_ref(), items.get(&item.key), 0)?;
        items.insert(item.key, item.attributes);
        Ok(())
    }

    async fn update(
        &self,
        key: &ItemKey,
        update: UpdateSpec,
        condition: Option<Condition>,
    ) -> Result<Item, StoreError> {
        let mut items = self.items.write();
        let current = items.get(key);
        check(condition.as_ref(), current, 0)?;
        let attributes = updated(current, &update, 0)?;
        items.insert(key.clone(), attributes.clone());
        Ok(Item { key: key.clone(), attributes })
    }

    async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for op in &ops {
            if !seen.insert(op.key()) {
                return Err(StoreError::InvalidTransaction(format!(
                    "multiple operations on {}",
                    op.key()
                )));
            }
        }

        let mut items = self.items.write();

        // Validate and stage everything before touching the map.
        let mut staged: Vec<(ItemKey, Option<Attributes>)> = Vec::with_capacity(ops.len());
        for (op_index, op) in ops.iter().enumerate() {
            match op {
                WriteOp::Put { item, condition } => {
                    check(condition.as_ref(), items.get(&item.key), op_index)?;
                    staged.push((item.key.clone(), Some(item.attributes.clone())));
                }
                WriteOp::Update { key, update, condition } => {
                    let current = items.get(key);
                    check(condition.as_ref(), current, op_index)?;
                    staged.push((key.clone(), Some(updated(current, update, op_index)?)));
                }
                WriteOp::Delete { key, condition } => {
                    check(condition.as_ref(), items.get(key), op_index)?;
                    staged.push((key.clone(), None));
                }
            }
        }

        for (key, value) in staged {
            match value {
                Some(attributes) => items.insert(key, attributes),
                None => items.remove(&key),
            };
        }
        debug!(ops = ops.len(), "transaction committed");
        Ok(())
    }

    async fn query(&self, query: Query) -> Result<Vec<Item>, StoreError> {
        let items = self.items.read();
        let start = ItemKey::new(query.pk.clone(), query.sk_prefix.clone());
        let matching = items
            .range(start..)
            .take_while(|(key, _)| key.pk == query.pk && key.sk.starts_with(&query.sk_prefix))
            .map(|(key, attributes)| Item { key: key.clone(), attributes: attributes.clone() });

        let mut result: Vec<Item> = if query.descending {
            let mut all: Vec<Item> = matching.collect();
            all.reverse();
            all
        } else {
            matching.collect()
        };

        if let Some(limit) = query.limit {
            result.truncate(limit);
        }
        Ok(result)
    }
}
