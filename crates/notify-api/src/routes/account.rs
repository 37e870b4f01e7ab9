//! Registration and account endpoints

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use notify_core::{BusinessInfo, RegisterCommand, Registration, RotateKeyCommand, RotatedKey};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::middleware::auth::ApiKeyHeader;
use crate::middleware::json::ApiJson;
use crate::models::{ApiResponse, RegenerateKeyRequest};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/account/regenerate-key", post(regenerate_key))
        .route("/account/info", get(info))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(command): ApiJson<RegisterCommand>,
) -> ApiResult<Registration> {
    let registration = state.service.register(command).await?;
    Ok(Json(ApiResponse::success(registration)))
}

pub async fn regenerate_key(
    State(state): State<Arc<AppState>>,
    ApiKeyHeader(api_key): ApiKeyHeader,
    ApiJson(proof): ApiJson<RegenerateKeyRequest>,
) -> ApiResult<RotatedKey> {
    let rotated = state
        .service
        .rotate_key(RotateKeyCommand { api_key, email: proof.email, phone: proof.phone })
        .await?;
    Ok(Json(ApiResponse::success(rotated)))
}

pub async fn info(
    State(state): State<Arc<AppState>>,
    ApiKeyHeader(api_key): ApiKeyHeader,
) -> ApiResult<BusinessInfo> {
    let info = state.service.get_info(&api_key).await?;
    Ok(Json(ApiResponse::success(info)))
}
