//! Plan usage endpoint

use axum::extract::State;
use axum::Json;
use notify_core::UsageReport;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::middleware::auth::ApiKeyHeader;
use crate::models::ApiResponse;
use crate::AppState;

pub async fn usage(
    State(state): State<Arc<AppState>>,
    ApiKeyHeader(api_key): ApiKeyHeader,
) -> ApiResult<UsageReport> {
    let report = state.service.get_usage(&api_key).await?;
    Ok(Json(ApiResponse::success(report)))
}
