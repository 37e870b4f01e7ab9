//! Ports Layer
//!
//! Hexagonal architecture: inbound use cases and outbound collaborators.

pub mod inbound;
pub mod outbound;
