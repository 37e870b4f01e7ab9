//! API key extraction
//!
//! Pulls the key out of the configured header. Only presence is checked
//! here; the core decides whether the key is valid.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// Raw api key from the request header
#[derive(Debug, Clone)]
pub struct ApiKeyHeader(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ApiKeyHeader {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(&state.api_key_header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| Self(key.to_string()))
            .ok_or(ApiError::MissingApiKey)
    }
}
