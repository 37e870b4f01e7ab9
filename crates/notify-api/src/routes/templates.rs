//! Template listing endpoint

use axum::extract::{Path, State};
use axum::Json;
use notify_core::{Channel, NotifyError, TemplateSummary};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::middleware::auth::ApiKeyHeader;
use crate::models::ApiResponse;
use crate::AppState;

pub async fn list_by_channel(
    State(state): State<Arc<AppState>>,
    ApiKeyHeader(api_key): ApiKeyHeader,
    Path(channel): Path<String>,
) -> ApiResult<Vec<TemplateSummary>> {
    let channel: Channel = channel.parse().map_err(NotifyError::Validation)?;
    let templates = state.service.list_templates(&api_key, channel).await?;
    Ok(Json(ApiResponse::success(templates)))
}
