//! API key rotation
//!
//! Swaps the api key index record and the metadata field in one
//! transaction. If any part fails the old key keeps working.

use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::identity::{IdentityIndex, IdentityKind};
use super::keys;
use crate::domain::value_objects::{ApiKey, BusinessId};
use crate::error::{NotifyError, NotifyResult};
use crate::ports::outbound::{Clock, Condition, KeyValueStore, StoreError, UpdateSpec, WriteOp};

/// Atomic api key swap
#[derive(Clone)]
pub struct ApiKeyRotator {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ApiKeyRotator {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Replace `old` with `new` for `business_id`.
    ///
    /// The caller must already have authenticated with `old` and checked the
    /// ownership proof. A taken `new` key is a `Conflict`; an `old` key that
    /// was rotated away concurrently is `Unauthorized`.
    pub async fn rotate(
        &self,
        business_id: &BusinessId,
        old: &ApiKey,
        new: &ApiKey,
    ) -> NotifyResult<()> {
        let ops = vec![
            IdentityIndex::release(IdentityIndex::api_key_key(old), business_id),
            IdentityIndex::claim(IdentityKind::ApiKey, IdentityIndex::api_key_key(new), business_id)?,
            WriteOp::Update {
                key: keys::business(business_id),
                update: UpdateSpec::new()
                    .set("apiKey", new.expose())
                    .set("updatedAt", json!(self.clock.now())),
                condition: Some(Condition::equals("apiKey", old.expose())),
            },
        ];

        match self.store.transact_write(ops).await {
            Ok(()) => {
                info!(business_id = %business_id, old = %old, new = %new, "api key rotated");
                Ok(())
            }
            Err(StoreError::ConditionFailed { op_index: 1 }) => {
                warn!(business_id = %business_id, "generated api key collided with an indexed key");
                Err(NotifyError::Conflict("api key already in use".into()))
            }
            Err(StoreError::ConditionFailed { .. }) => {
                warn!(business_id = %business_id, old = %old, "rotation lost race: key no longer current");
                Err(NotifyError::Unauthorized("invalid API key".into()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
