//! Error types for the notification core

use crate::ports::outbound::{StoreError, TransportError};
use thiserror::Error;

/// Coarse error classification handed to the boundary layer.
///
/// The boundary maps kinds to status codes; it never inspects messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown or mismatched API key / ownership proof
    Unauthorized,
    /// Malformed input
    Validation,
    /// Duplicate email, phone or API key
    Conflict,
    /// Plan allowance for the current period is used up
    QuotaExceeded,
    /// Plan, template or business missing
    NotFound,
    /// Catalog misconfiguration behind an otherwise valid request
    ServiceUnavailable,
    /// Store unreachable or transaction aborted
    Storage,
    /// Transport collaborator failed
    Delivery,
}

/// Notification core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Authentication failed
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// Input validation failed
    #[error("{0}")]
    Validation(String),

    /// Unique identifier already taken
    #[error("{0}")]
    Conflict(String),

    /// Notification limit reached
    #[error("notification limit reached ({limit} per period)")]
    QuotaExceeded {
        /// Plan allowance per period
        limit: u64,
    },

    /// Entity not found
    #[error("{0} not found")]
    NotFound(String),

    /// Service unavailable
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Storage failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Delivery failure
    #[error("failed to send notification: {0}")]
    Delivery(String),
}

impl NotifyError {
    /// Error kind tag
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Delivery(_) => ErrorKind::Delivery,
        }
    }

    /// Shorthand for a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<StoreError> for NotifyError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<TransportError> for NotifyError {
    fn from(err: TransportError) -> Self {
        Self::Delivery(err.to_string())
    }
}

/// Result type for the notification core
pub type NotifyResult<T> = Result<T, NotifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(NotifyError::Conflict("x".into()).kind(), ErrorKind::Conflict);
        assert_eq!(NotifyError::QuotaExceeded { limit: 3 }.kind(), ErrorKind::QuotaExceeded);
        assert_eq!(NotifyError::validation("bad").kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_store_errors_become_storage() {
        let err: NotifyError = StoreError::Unavailable("timeout".into()).into();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_transport_errors_become_delivery() {
        let err: NotifyError = TransportError::Rejected("bad number".into()).into();
        assert_eq!(err.kind(), ErrorKind::Delivery);
    }
}
