//! API Routes

pub mod account;
pub mod health;
pub mod notifications;
pub mod plan;
pub mod templates;
