//! API error mapping
//!
//! The only place core error kinds become HTTP status codes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notify_core::{ErrorKind, NotifyError};
use thiserror::Error;

use crate::models::ApiResponse;

/// Boundary error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] NotifyError),

    #[error("API key is required")]
    MissingApiKey,

    #[error("invalid request body: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::MissingApiKey => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Core(e) => match e.kind() {
                ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
                ErrorKind::QuotaExceeded => (StatusCode::TOO_MANY_REQUESTS, "QUOTA_EXCEEDED"),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ErrorKind::ServiceUnavailable => {
                    (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
                }
                ErrorKind::Storage => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
                ErrorKind::Delivery => (StatusCode::BAD_GATEWAY, "DELIVERY_FAILED"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            Self::Core(NotifyError::Storage(detail)) => {
                tracing::error!(error = %detail, "storage failure");
                "internal error".to_string()
            }
            Self::Core(NotifyError::QuotaExceeded { .. }) => {
                "notification limit reached. Please upgrade your plan".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ApiResponse::<()>::error(code, &message))).into_response()
    }
}

/// Handler result
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_status() {
        let cases = [
            (NotifyError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (NotifyError::validation("x"), StatusCode::BAD_REQUEST),
            (NotifyError::Conflict("x".into()), StatusCode::CONFLICT),
            (NotifyError::QuotaExceeded { limit: 1 }, StatusCode::TOO_MANY_REQUESTS),
            (NotifyError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (NotifyError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (NotifyError::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (NotifyError::Delivery("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), status);
        }
    }

    #[test]
    fn test_missing_key_is_unauthorized() {
        assert_eq!(ApiError::MissingApiKey.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
