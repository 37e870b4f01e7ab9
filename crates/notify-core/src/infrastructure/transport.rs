//! Logging transport
//!
//! Accepts every message and logs it. Stands in for provider gateways in
//! local runs; message ids mimic provider ids per channel.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::ports::outbound::{
    DeliveryReceipt, EmailMessage, EmailTransport, SmsMessage, SmsTransport, TransportError,
    WhatsAppMessage, WhatsAppTransport,
};

/// Transport that only writes log lines
#[derive(Clone, Debug)]
pub struct LoggingTransport {
    from_address: String,
}

impl LoggingTransport {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self { from_address: from_address.into() }
    }

    fn receipt(prefix: &str) -> DeliveryReceipt {
        DeliveryReceipt { message_id: format!("{}_{}", prefix, Uuid::new_v4().simple()) }
    }
}

impl Default for LoggingTransport {
    fn default() -> Self {
        Self::new("no-reply@notify.local")
    }
}

#[async_trait]
impl EmailTransport for LoggingTransport {
    async fn send_email(&self, message: &EmailMessage) -> Result<DeliveryReceipt, TransportError> {
        let receipt = Self::receipt("EMAIL");
        info!(
            message_id = %receipt.message_id,
            from = %format!("{} <{}>", message.from_name, self.from_address),
            to = %message.to,
            subject = %message.subject,
            html = message.html,
            "email accepted"
        );
        Ok(receipt)
    }
}

#[async_trait]
impl SmsTransport for LoggingTransport {
    async fn send_sms(&self, message: &SmsMessage) -> Result<DeliveryReceipt, TransportError> {
        let receipt = Self::receipt("SMS");
        info!(
            message_id = %receipt.message_id,
            to = %message.to,
            chars = message.body.chars().count(),
            "sms accepted"
        );
        Ok(receipt)
    }
}

#[async_trait]
impl WhatsAppTransport for LoggingTransport {
    async fn send_whatsapp(&self, message: &WhatsAppMessage) -> Result<DeliveryReceipt, TransportError> {
        let receipt = Self::receipt("WA");
        info!(
            message_id = %receipt.message_id,
            to = %message.to,
            content_id = %message.content_id,
            variables = %message.content_variables_json(),
            "whatsapp accepted"
        );
        Ok(receipt)
    }
}
