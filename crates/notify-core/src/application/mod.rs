//! Application layer
//!
//! Orchestrates use cases over the store, clock, template and transport ports.

pub mod directory;
pub mod dispatch;
pub mod dto;
pub mod identity;
pub mod keys;
pub mod plans;
pub mod quota;
pub mod rotation;
pub mod service;
pub mod usage;

pub use directory::BusinessDirectory;
pub use dispatch::DispatchRouter;
pub use identity::{IdentityIndex, IdentityKind};
pub use plans::PlanCatalog;
pub use quota::{QuotaGate, QuotaTicket};
pub use rotation::ApiKeyRotator;
pub use service::{NotifyService, NotifyServiceBuilder};
pub use usage::UsagePeriodTracker;
