//! Spy transport for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ports::outbound::{
    DeliveryReceipt, EmailMessage, EmailTransport, SmsMessage, SmsTransport, TransportError,
    WhatsAppMessage, WhatsAppTransport,
};

/// A message handed to the spy
#[derive(Clone, Debug, PartialEq)]
pub enum SentMessage {
    Email(EmailMessage),
    Sms(SmsMessage),
    WhatsApp(WhatsAppMessage),
}

/// Records every message; can be switched to reject them all
#[derive(Debug, Default)]
pub struct SpyTransport {
    sent: Mutex<Vec<SentMessage>>,
    failing: AtomicBool,
}

impl SpyTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Messages accepted so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }

    fn record(&self, message: SentMessage) -> Result<DeliveryReceipt, TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable("spy set to fail".into()));
        }
        let mut sent = self.sent.lock();
        sent.push(message);
        Ok(DeliveryReceipt { message_id: format!("SPY-{}", sent.len()) })
    }
}

#[async_trait]
impl EmailTransport for SpyTransport {
    async fn send_email(&self, message: &EmailMessage) -> Result<DeliveryReceipt, TransportError> {
        self.record(SentMessage::Email(message.clone()))
    }
}

#[async_trait]
impl SmsTransport for SpyTransport {
    async fn send_sms(&self, message: &SmsMessage) -> Result<DeliveryReceipt, TransportError> {
        self.record(SentMessage::Sms(message.clone()))
    }
}

#[async_trait]
impl WhatsAppTransport for SpyTransport {
    async fn send_whatsapp(&self, message: &WhatsAppMessage) -> Result<DeliveryReceipt, TransportError> {
        self.record(SentMessage::WhatsApp(message.clone()))
    }
}
