//! Domain Layer
//!
//! Entities and value objects of the notification platform. No I/O here.

pub mod business;
pub mod plan;
pub mod template;
pub mod usage;
pub mod value_objects;

pub use business::Business;
pub use plan::Plan;
pub use template::{Channel, ParameterCheck, Template};
pub use usage::UsagePeriod;
