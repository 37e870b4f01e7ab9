//! Identity index
//!
//! One record per unique identifier value. The record's own key embeds the
//! value, so "create if absent" on that key is the uniqueness check.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::keys;
use crate::domain::value_objects::{ApiKey, BusinessId, Email, Phone};
use crate::domain::Business;
use crate::error::NotifyResult;
use crate::ports::outbound::{Condition, Item, ItemKey, KeyValueStore, WriteOp};

/// Kind of unique identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityKind {
    Email,
    Phone,
    ApiKey,
}

impl IdentityKind {
    fn namespace(self) -> &'static str {
        match self {
            Self::Email => "EMAIL#",
            Self::Phone => "PHONE#",
            Self::ApiKey => "APIKEY#",
        }
    }
}

/// Body of an index record: points at the owning business
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    pub business_id: BusinessId,
    pub kind: IdentityKind,
}

/// Read/write helper over the index namespaces
#[derive(Clone)]
pub struct IdentityIndex {
    store: Arc<dyn KeyValueStore>,
}

impl IdentityIndex {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn key(kind: IdentityKind, value: &str) -> ItemKey {
        ItemKey::new(format!("{}{}", kind.namespace(), value), keys::INDEX_SK)
    }

    pub fn email_key(email: &Email) -> ItemKey {
        Self::key(IdentityKind::Email, email.as_str())
    }

    pub fn phone_key(phone: &Phone) -> ItemKey {
        Self::key(IdentityKind::Phone, phone.as_str())
    }

    pub fn api_key_key(api_key: &ApiKey) -> ItemKey {
        Self::key(IdentityKind::ApiKey, api_key.expose())
    }

    /// Conditional create of one index record
    pub fn claim(kind: IdentityKind, key: ItemKey, owner: &BusinessId) -> NotifyResult<WriteOp> {
        let record = IndexRecord { business_id: owner.clone(), kind };
        Ok(WriteOp::put_if_absent(Item::from_record(key, &record)?))
    }

    /// Index claims for all three identifiers of a business, in
    /// email, phone, api key order
    pub fn claims_for(business: &Business) -> NotifyResult<Vec<WriteOp>> {
        Ok(vec![
            Self::claim(IdentityKind::Email, Self::email_key(&business.email), &business.id)?,
            Self::claim(IdentityKind::Phone, Self::phone_key(&business.phone), &business.id)?,
            Self::claim(IdentityKind::ApiKey, Self::api_key_key(&business.api_key), &business.id)?,
        ])
    }

    /// Delete of an index record, only while it still points at `owner`
    pub fn release(key: ItemKey, owner: &BusinessId) -> WriteOp {
        WriteOp::Delete {
            key,
            condition: Some(Condition::equals("businessId", owner.as_str())),
        }
    }

    /// Owner of an identifier value, if indexed
    pub async fn resolve(&self, key: &ItemKey) -> NotifyResult<Option<BusinessId>> {
        match self.store.get(key).await? {
            Some(item) => Ok(Some(item.to_record::<IndexRecord>()?.business_id)),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, key: &ItemKey) -> NotifyResult<bool> {
        Ok(self.store.get(key).await?.is_some())
    }
}
