//! Infrastructure layer - adapters for the outbound ports.
//!
//! This layer provides:
//! - An in-memory key-value store with conditional transactions
//! - A template catalog read from that store, plus catalog seeding
//! - The system clock and a logging transport

pub mod catalog;
pub mod clock;
pub mod store;
pub mod transport;

pub use catalog::{seed_plans, seed_templates, StoreTemplateCatalog};
pub use clock::SystemClock;
pub use store::InMemoryStore;
pub use transport::LoggingTransport;

/// Test doubles.
///
/// Available in test builds and with the `test-helpers` feature:
/// ```toml
/// [dev-dependencies]
/// notify-core = { path = "../notify-core", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
