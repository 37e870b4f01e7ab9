//! API Models

use serde::{Deserialize, Serialize};

/// Standard API response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Health check body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Ownership proof for `POST /account/regenerate-key`; the current key
/// travels in the api key header
#[derive(Debug, Serialize, Deserialize)]
pub struct RegenerateKeyRequest {
    pub email: String,
    pub phone: String,
}

/// Untemplated notification for `POST /notifications/send`
#[derive(Debug, Serialize, Deserialize)]
pub struct SendRequest {
    pub to: String,
    pub message: String,
    #[serde(rename = "type")]
    pub channel: String,
}
