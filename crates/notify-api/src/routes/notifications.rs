//! Notification endpoints

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use notify_core::{
    Channel, DispatchReceipt, DispatchRequest, EmailPayload, NotifyError, SmsPayload,
    TemplatePayload,
};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::ApiKeyHeader;
use crate::middleware::json::ApiJson;
use crate::models::{ApiResponse, SendRequest};
use crate::AppState;

/// Subject used for emails sent through the generic endpoint
pub const DEFAULT_SUBJECT: &str = "Notification";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/email", post(send_email))
        .route("/sms", post(send_sms))
        .route("/whatsapp", post(send_whatsapp))
        .route("/send", post(send))
}

async fn dispatch(state: &AppState, api_key: &str, request: DispatchRequest) -> ApiResult<DispatchReceipt> {
    let receipt = state.service.dispatch(api_key, request).await?;
    Ok(Json(ApiResponse::success(receipt)))
}

pub async fn send_email(
    State(state): State<Arc<AppState>>,
    ApiKeyHeader(api_key): ApiKeyHeader,
    ApiJson(payload): ApiJson<EmailPayload>,
) -> ApiResult<DispatchReceipt> {
    dispatch(&state, &api_key, DispatchRequest::Email(payload)).await
}

/// Templated SMS
pub async fn send_sms(
    State(state): State<Arc<AppState>>,
    ApiKeyHeader(api_key): ApiKeyHeader,
    ApiJson(payload): ApiJson<TemplatePayload>,
) -> ApiResult<DispatchReceipt> {
    dispatch(&state, &api_key, DispatchRequest::SmsTemplate(payload)).await
}

pub async fn send_whatsapp(
    State(state): State<Arc<AppState>>,
    ApiKeyHeader(api_key): ApiKeyHeader,
    ApiJson(payload): ApiJson<TemplatePayload>,
) -> ApiResult<DispatchReceipt> {
    dispatch(&state, &api_key, DispatchRequest::WhatsApp(payload)).await
}

/// Free-text message on the channel named by `type`
pub async fn send(
    State(state): State<Arc<AppState>>,
    ApiKeyHeader(api_key): ApiKeyHeader,
    ApiJson(body): ApiJson<SendRequest>,
) -> ApiResult<DispatchReceipt> {
    let channel: Channel = body.channel.parse().map_err(NotifyError::Validation)?;
    let request = match channel {
        Channel::Sms => DispatchRequest::Sms(SmsPayload { to: body.to, message: body.message }),
        Channel::Email => DispatchRequest::Email(EmailPayload {
            to: body.to,
            subject: DEFAULT_SUBJECT.to_string(),
            body: body.message,
            html: false,
        }),
        Channel::WhatsApp => {
            return Err(ApiError::from(NotifyError::validation(
                "whatsapp messages require a template; use /notifications/whatsapp",
            )))
        }
    };
    dispatch(&state, &api_key, request).await
}
