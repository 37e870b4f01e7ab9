//! Mock implementations for testing.

pub mod clock;
pub mod fixtures;
pub mod store;
pub mod transport;

pub use clock::MockClock;
pub use store::{FailingStore, StoreOp};
pub use transport::{SentMessage, SpyTransport};
