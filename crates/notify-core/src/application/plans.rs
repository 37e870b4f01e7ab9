//! Plan catalog (read-only)

use std::sync::Arc;
use tracing::debug;

use super::keys;
use crate::domain::Plan;
use crate::error::{NotifyError, NotifyResult};
use crate::ports::outbound::KeyValueStore;

/// Read-only plan lookup
#[derive(Clone)]
pub struct PlanCatalog {
    store: Arc<dyn KeyValueStore>,
}

impl PlanCatalog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Active plan by id; missing and inactive plans are both `NotFound`
    pub async fn get_by_id(&self, plan_id: &str) -> NotifyResult<Plan> {
        let plan: Plan = match self.store.get(&keys::plan(plan_id)).await? {
            Some(item) => item.to_record()?,
            None => return Err(NotifyError::NotFound(format!("plan {}", plan_id))),
        };

        if !plan.active {
            debug!(plan_id, "plan is inactive");
            return Err(NotifyError::NotFound(format!("plan {}", plan_id)));
        }

        Ok(plan)
    }
}
