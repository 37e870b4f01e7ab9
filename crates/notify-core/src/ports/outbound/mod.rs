//! Outbound ports
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must implement.

pub mod store;
pub mod transport;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Channel, Template};

pub use store::{
    Attributes, Condition, Item, ItemKey, KeyValueStore, Query, StoreError, UpdateSpec, WriteOp,
};
pub use transport::{
    DeliveryReceipt, EmailMessage, EmailTransport, SmsMessage, SmsTransport, TransportError,
    WhatsAppMessage, WhatsAppTransport,
};

/// Wall-clock port
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Template lookup port
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Find template by id
    async fn get_template(&self, id: &str) -> Result<Option<Template>, StoreError>;

    /// Active templates of one channel
    async fn list_active_by_type(&self, channel: Channel) -> Result<Vec<Template>, StoreError>;
}
