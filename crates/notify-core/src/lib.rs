//! Notify Platform Core
//!
//! Tenant identity, plan quotas and notification dispatch on top of a single
//! flat key-value store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          NOTIFY PLATFORM CORE                           │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                     NotifyService (inbound)                      │  │
//! │  │   register | rotate_key | get_info | dispatch | get_usage        │  │
//! │  └───────┬──────────────────┬──────────────────┬────────────────────┘  │
//! │          │                  │                  │                       │
//! │  ┌───────▼───────┐  ┌───────▼───────┐  ┌───────▼──────────────────┐    │
//! │  │   Business    │  │    ApiKey     │  │      DispatchRouter       │    │
//! │  │  Directory    │  │   Rotator     │  │  QuotaGate ─► Transports  │    │
//! │  │ (identity idx)│  │               │  │  PlanCatalog │ UsageTrack │    │
//! │  └───────┬───────┘  └───────┬───────┘  └───────┬──────────────────┘    │
//! │          │                  │                  │                       │
//! │  ┌───────▼──────────────────▼──────────────────▼────────────────────┐  │
//! │  │          KeyValueStore (conditional put / transactions)           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is the only synchronization point. Uniqueness of email, phone
//! and API key is enforced with one index record per identifier, written in
//! the same conditional transaction as the business metadata.

#![warn(missing_docs)]

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use application::dto::{
    BusinessInfo, DispatchReceipt, DispatchRequest, EmailPayload, Registration, RegisterCommand,
    RotateKeyCommand, RotatedKey, SmsPayload, TemplatePayload, TemplateSummary, UsageReport,
};
pub use application::{NotifyService, NotifyServiceBuilder};
pub use domain::{Business, Channel, Plan, Template, UsagePeriod};
pub use domain::value_objects::{ApiKey, BusinessId, Email, Phone};
pub use error::{ErrorKind, NotifyError, NotifyResult};
pub use infrastructure::{InMemoryStore, LoggingTransport, StoreTemplateCatalog, SystemClock};
pub use ports::inbound::NotifyUseCases;
pub use ports::outbound::{Clock, KeyValueStore, StoreError, TemplateCatalog, TransportError};
