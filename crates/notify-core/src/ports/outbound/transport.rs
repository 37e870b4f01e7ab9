//! Delivery transport ports
//!
//! The core only decides whether and what to hand over; how the bytes reach
//! the provider is the transport's business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::value_objects::{Email, Phone};

/// Outbound email
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: Email,
    pub subject: String,
    pub body: String,
    pub html: bool,
    /// Display name of the sender (the business)
    pub from_name: String,
}

/// Outbound SMS
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub to: Phone,
    pub body: String,
}

/// Outbound WhatsApp template message.
///
/// Providers only accept positional substitution, so variables are keyed
/// `"1"`, `"2"`, ... in the template's declared parameter order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WhatsAppMessage {
    pub to: Phone,
    pub content_id: String,
    pub variables: BTreeMap<String, String>,
}

impl WhatsAppMessage {
    /// Variables as the JSON object providers expect
    pub fn content_variables_json(&self) -> String {
        serde_json::to_string(&self.variables).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Provider acknowledgement
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Provider-assigned message id
    pub message_id: String,
}

/// Transport error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport not configured")]
    NotConfigured,

    #[error("provider rejected message: {0}")]
    Rejected(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Email transport port
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> Result<DeliveryReceipt, TransportError>;
}

/// SMS transport port
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn send_sms(&self, message: &SmsMessage) -> Result<DeliveryReceipt, TransportError>;
}

/// WhatsApp transport port
#[async_trait]
pub trait WhatsAppTransport: Send + Sync {
    async fn send_whatsapp(
        &self,
        message: &WhatsAppMessage,
    ) -> Result<DeliveryReceipt, TransportError>;
}
