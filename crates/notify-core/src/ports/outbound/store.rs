//! Key-value store port
//!
//! One logical table keyed by `(pk, sk)`. The port offers point reads,
//! conditional single-item writes, all-or-nothing multi-item transactions
//! and prefix queries inside one partition. There is no secondary index;
//! callers emulate uniqueness with records whose key is the unique value.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Attribute map of a stored item
pub type Attributes = serde_json::Map<String, Value>;

/// Composite primary key
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self { pk: pk.into(), sk: sk.into() }
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.pk, self.sk)
    }
}

/// Stored item
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub key: ItemKey,
    pub attributes: Attributes,
}

impl Item {
    /// Build an item from any record that serializes to a JSON object
    pub fn from_record<T: Serialize>(key: ItemKey, record: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(record).map_err(|e| StoreError::Serialization(e.to_string()))? {
            Value::Object(attributes) => Ok(Self { key, attributes }),
            other => Err(StoreError::Serialization(format!(
                "record for {} is not an object: {}",
                key, other
            ))),
        }
    }

    /// Decode the attributes into a record
    pub fn to_record<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.attributes.clone()))
            .map_err(|e| StoreError::Serialization(format!("{}: {}", self.key, e)))
    }
}

/// Write precondition, evaluated against the item currently stored
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// No item with this key exists
    NotExists,
    /// An item with this key exists
    Exists,
    /// Item exists and `name` equals `value`
    AttributeEquals { name: String, value: Value },
    /// Item exists and has no attribute `name`
    AttributeAbsent(String),
    /// Item exists and numeric attribute `name` (missing = 0) is below `bound`
    AttributeBelow { name: String, bound: i64 },
}

impl Condition {
    pub fn equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::AttributeEquals { name: name.into(), value: value.into() }
    }

    pub fn below(name: impl Into<String>, bound: i64) -> Self {
        Self::AttributeBelow { name: name.into(), bound }
    }

    /// Evaluate against the current attributes (`None` = no item)
    pub fn evaluate(&self, current: Option<&Attributes>) -> bool {
        match (self, current) {
            (Self::NotExists, current) => current.is_none(),
            (Self::Exists, current) => current.is_some(),
            (_, None) => false,
            (Self::AttributeEquals { name, value }, Some(attrs)) => attrs.get(name) == Some(value),
            (Self::AttributeAbsent(name), Some(attrs)) => {
                attrs.get(name).map_or(true, Value::is_null)
            }
            (Self::AttributeBelow { name, bound }, Some(attrs)) => {
                numeric(attrs.get(name)).map_or(false, |n| n < *bound)
            }
        }
    }
}

fn numeric(value: Option<&Value>) -> Option<i64> {
    match value {
        None | Some(Value::Null) => Some(0),
        Some(v) => v.as_i64(),
    }
}

/// Attribute changes applied by an update
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateSpec {
    pub set: Vec<(String, Value)>,
    pub add: Vec<(String, i64)>,
}

impl UpdateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite an attribute
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((name.into(), value.into()));
        self
    }

    /// Atomically add `delta` to a numeric attribute (missing = 0)
    pub fn add(mut self, name: impl Into<String>, delta: i64) -> Self {
        self.add.push((name.into(), delta));
        self
    }

    /// Apply to an attribute map in place
    pub fn apply(&self, attrs: &mut Attributes) -> Result<(), StoreError> {
        for (name, value) in &self.set {
            attrs.insert(name.clone(), value.clone());
        }
        for (name, delta) in &self.add {
            let current = numeric(attrs.get(name)).ok_or_else(|| {
                StoreError::Serialization(format!("attribute {} is not numeric", name))
            })?;
            attrs.insert(name.clone(), Value::from(current + delta));
        }
        Ok(())
    }
}

/// One operation of a multi-item transaction
#[derive(Clone, Debug, PartialEq)]
pub enum WriteOp {
    Put { item: Item, condition: Option<Condition> },
    /// Updates require the item to exist
    Update { key: ItemKey, update: UpdateSpec, condition: Option<Condition> },
    Delete { key: ItemKey, condition: Option<Condition> },
}

impl WriteOp {
    pub fn put_if_absent(item: Item) -> Self {
        Self::Put { item, condition: Some(Condition::NotExists) }
    }

    pub fn key(&self) -> &ItemKey {
        match self {
            Self::Put { item, .. } => &item.key,
            Self::Update { key, .. } | Self::Delete { key, .. } => key,
        }
    }
}

/// Range query inside one partition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub pk: String,
    pub sk_prefix: String,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl Query {
    pub fn partition(pk: impl Into<String>) -> Self {
        Self { pk: pk.into(), sk_prefix: String::new(), descending: false, limit: None }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sk_prefix = prefix.into();
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.descending = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Store error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A precondition did not hold; `op_index` is the failing operation
    /// (always 0 for single-item calls). Nothing was written.
    #[error("conditional check failed (operation {op_index})")]
    ConditionFailed { op_index: usize },

    /// The transaction itself is malformed (e.g. two operations on one key)
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Backend unreachable or aborted the request
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Record could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key-value store port
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Point read
    async fn get(&self, key: &ItemKey) -> Result<Option<Item>, StoreError>;

    /// Write an item, replacing any existing one, if `condition` holds
    async fn put(&self, item: Item, condition: Option<Condition>) -> Result<(), StoreError>;

    /// Apply `update` to an existing item if `condition` holds; returns the new item
    async fn update(
        &self,
        key: &ItemKey,
        update: UpdateSpec,
        condition: Option<Condition>,
    ) -> Result<Item, StoreError>;

    /// Apply all operations or none
    async fn transact_write(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;

    /// Items of one partition whose sort key starts with the prefix, in sort-key order
    async fn query(&self, query: Query) -> Result<Vec<Item>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_existence_conditions() {
        let item = attrs(json!({"a": 1}));
        assert!(Condition::NotExists.evaluate(None));
        assert!(!Condition::NotExists.evaluate(Some(&item)));
        assert!(Condition::Exists.evaluate(Some(&item)));
        assert!(!Condition::equals("a", 1).evaluate(None));
    }

    #[test]
    fn test_attribute_conditions() {
        let item = attrs(json!({"apiKey": "nfy_old", "count": 2}));
        assert!(Condition::equals("apiKey", "nfy_old").evaluate(Some(&item)));
        assert!(!Condition::equals("apiKey", "nfy_new").evaluate(Some(&item)));
        assert!(Condition::AttributeAbsent("retiredAt".into()).evaluate(Some(&item)));
        assert!(Condition::below("count", 3).evaluate(Some(&item)));
        assert!(!Condition::below("count", 2).evaluate(Some(&item)));
        assert!(Condition::below("missing", 1).evaluate(Some(&item)));
    }

    #[test]
    fn test_update_spec_apply() {
        let mut item = attrs(json!({"count": 4, "name": "a"}));
        UpdateSpec::new()
            .set("name", "b")
            .add("count", 1)
            .add("fresh", 2)
            .apply(&mut item)
            .unwrap();
        assert_eq!(item["name"], json!("b"));
        assert_eq!(item["count"], json!(5));
        assert_eq!(item["fresh"], json!(2));
    }

    #[test]
    fn test_add_to_non_numeric_fails() {
        let mut item = attrs(json!({"name": "a"}));
        let result = UpdateSpec::new().add("name", 1).apply(&mut item);
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_record_roundtrip_rejects_scalars() {
        let key = ItemKey::new("PLAN#FREE", "METADATA");
        assert!(Item::from_record(key, &5).is_err());
    }
}
