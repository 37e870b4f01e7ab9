//! Business directory
//!
//! Owns business metadata and its identity index records. Registration
//! writes the three index records and the metadata record in one
//! conditional transaction, so either all four exist or none do.

use std::sync::Arc;
use tracing::{debug, warn};

use super::identity::IdentityIndex;
use super::keys;
use crate::domain::value_objects::{ApiKey, BusinessId, Email, Phone};
use crate::domain::Business;
use crate::error::{NotifyError, NotifyResult};
use crate::ports::outbound::{Item, KeyValueStore, StoreError, WriteOp};

/// Directory of registered businesses
#[derive(Clone)]
pub struct BusinessDirectory {
    store: Arc<dyn KeyValueStore>,
    index: IdentityIndex,
}

impl BusinessDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { index: IdentityIndex::new(store.clone()), store }
    }

    pub async fn email_exists(&self, email: &Email) -> NotifyResult<bool> {
        self.index.exists(&IdentityIndex::email_key(email)).await
    }

    pub async fn phone_exists(&self, phone: &Phone) -> NotifyResult<bool> {
        self.index.exists(&IdentityIndex::phone_key(phone)).await
    }

    /// Atomically create index records and metadata.
    ///
    /// Fails with `Conflict` naming the first identifier that was taken.
    pub async fn create(&self, business: &Business) -> NotifyResult<()> {
        let mut ops = IdentityIndex::claims_for(business)?;
        ops.push(WriteOp::put_if_absent(Item::from_record(
            keys::business(&business.id),
            business,
        )?));

        match self.store.transact_write(ops).await {
            Ok(()) => {
                debug!(business_id = %business.id, "business records written");
                Ok(())
            }
            Err(StoreError::ConditionFailed { op_index }) => {
                let message = match op_index {
                    0 => "email already registered",
                    1 => "phone already registered",
                    2 => "api key already in use",
                    _ => "business already exists",
                };
                warn!(business_id = %business.id, op_index, "registration conflict: {}", message);
                Err(NotifyError::Conflict(message.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve the api key index, then fetch metadata
    pub async fn get_by_api_key(&self, api_key: &ApiKey) -> NotifyResult<Business> {
        let id = self
            .index
            .resolve(&IdentityIndex::api_key_key(api_key))
            .await?
            .ok_or_else(|| NotifyError::NotFound("business".into()))?;
        self.get_by_id(&id).await
    }

    pub async fn get_by_id(&self, id: &BusinessId) -> NotifyResult<Business> {
        match self.store.get(&keys::business(id)).await? {
            Some(item) => Ok(item.to_record()?),
            None => Err(NotifyError::NotFound("business".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::infrastructure::InMemoryStore;
    use chrono::Utc;

    fn business(email: &str, phone: &str) -> Business {
        Business::register(
            "Acme",
            Email::new(email).unwrap(),
            Phone::parse(phone).unwrap(),
            "FREE",
            Utc::now(),
        )
    }

    fn directory() -> (Arc<InMemoryStore>, BusinessDirectory) {
        let store = Arc::new(InMemoryStore::new());
        (store.clone(), BusinessDirectory::new(store))
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let (store, directory) = directory();
        let acme = business("a@x.com", "+15551234567");
        directory.create(&acme).await.unwrap();

        assert_eq!(store.len(), 4);
        assert!(directory.email_exists(&acme.email).await.unwrap());
        assert!(directory.phone_exists(&acme.phone).await.unwrap());

        let found = directory.get_by_api_key(&acme.api_key).await.unwrap();
        assert_eq!(found, acme);
        assert_eq!(directory.get_by_id(&acme.id).await.unwrap().name, "Acme");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_regardless_of_phone() {
        let (store, directory) = directory();
        directory.create(&business("a@x.com", "+15551234567")).await.unwrap();

        let err = directory
            .create(&business("A@X.COM", "+15559999999"))
            .await
            .unwrap_err();
        assert_eq!(err, NotifyError::Conflict("email already registered".into()));
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_phone_leaves_no_partial_state() {
        let (store, directory) = directory();
        directory.create(&business("a@x.com", "+15551234567")).await.unwrap();

        let other = business("b@y.com", "+15551234567");
        let err = directory.create(&other).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(!directory.email_exists(&other.email).await.unwrap());
        assert_eq!(store.len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_key_is_not_found() {
        let (_, directory) = directory();
        let err = directory.get_by_api_key(&ApiKey::generate()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
