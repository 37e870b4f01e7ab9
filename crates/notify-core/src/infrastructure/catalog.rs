//! Catalog records in the store
//!
//! Templates are read through the [`TemplateCatalog`] port. Plans and
//! templates are authored elsewhere; the seed functions only bootstrap an
//! empty store from configuration.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::application::keys;
use crate::domain::{Channel, Plan, Template};
use crate::ports::outbound::{Item, KeyValueStore, Query, StoreError, TemplateCatalog};

/// Template catalog backed by the `TEMPLATE` partition
#[derive(Clone)]
pub struct StoreTemplateCatalog {
    store: Arc<dyn KeyValueStore>,
}

impl StoreTemplateCatalog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TemplateCatalog for StoreTemplateCatalog {
    async fn get_template(&self, id: &str) -> Result<Option<Template>, StoreError> {
        match self.store.get(&keys::template(id)).await? {
            Some(item) => Ok(Some(item.to_record()?)),
            None => Ok(None),
        }
    }

    async fn list_active_by_type(&self, channel: Channel) -> Result<Vec<Template>, StoreError> {
        let items = self.store.query(Query::partition(keys::TEMPLATE_PARTITION)).await?;
        let mut templates = Vec::with_capacity(items.len());
        for item in items {
            let template: Template = item.to_record()?;
            if template.active && template.channel == channel {
                templates.push(template);
            }
        }
        Ok(templates)
    }
}

/// Write plan records, replacing existing ones with the same id
pub async fn seed_plans(store: &dyn KeyValueStore, plans: &[Plan]) -> Result<(), StoreError> {
    for plan in plans {
        store.put(Item::from_record(keys::plan(&plan.id), plan)?, None).await?;
    }
    info!(count = plans.len(), "plans seeded");
    Ok(())
}

/// Write template records, replacing existing ones with the same id
pub async fn seed_templates(store: &dyn KeyValueStore, templates: &[Template]) -> Result<(), StoreError> {
    for template in templates {
        store
            .put(Item::from_record(keys::template(&template.id), template)?, None)
            .await?;
    }
    info!(count = templates.len(), "templates seeded");
    Ok(())
}
