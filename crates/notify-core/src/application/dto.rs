//! Data Transfer Objects (DTOs)
//!
//! Commands in, read models out. Raw strings come in; the service
//! validates them into value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{Business, Channel, Template};

// =============================================================================
// Account Commands
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCommand {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Empty or absent means the default plan
    #[serde(default, alias = "plan_id")]
    pub plan_id: Option<String>,
}

/// Ownership proof for a key rotation: the current key plus the
/// registered email and phone
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateKeyCommand {
    pub api_key: String,
    pub email: String,
    pub phone: String,
}

// =============================================================================
// Dispatch Commands
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPayload {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub html: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsPayload {
    pub to: String,
    pub message: String,
}

/// Templated SMS or WhatsApp message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePayload {
    pub to: String,
    #[serde(alias = "template_id")]
    pub template_id: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// One notification to send
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchRequest {
    Email(EmailPayload),
    Sms(SmsPayload),
    SmsTemplate(TemplatePayload),
    WhatsApp(TemplatePayload),
}

impl DispatchRequest {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Email(_) => Channel::Email,
            Self::Sms(_) | Self::SmsTemplate(_) => Channel::Sms,
            Self::WhatsApp(_) => Channel::WhatsApp,
        }
    }
}

// =============================================================================
// Views (Read Models)
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub business_id: String,
    pub api_key: String,
    pub plan_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotatedKey {
    pub api_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    pub business_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plan_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Business> for BusinessInfo {
    fn from(business: &Business) -> Self {
        Self {
            business_id: business.id.to_string(),
            name: business.name.clone(),
            email: business.email.to_string(),
            phone: business.phone.to_string(),
            plan_id: business.plan_id.clone(),
            created_at: business.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReceipt {
    /// Provider message id
    pub notification_id: String,
    pub notification_count: u64,
    pub notification_left: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_used: Option<String>,
    /// Caller parameters the template does not declare; ignored
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_parameters: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub business_id: String,
    pub plan_id: String,
    pub plan_name: String,
    pub notification_limit: u64,
    pub notification_count: u64,
    pub notification_left: u64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub period_days: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub channel: Channel,
    pub parameters: Vec<String>,
    pub description: String,
}

impl From<Template> for TemplateSummary {
    fn from(template: Template) -> Self {
        Self {
            id: template.id,
            name: template.name,
            channel: template.channel,
            parameters: template.parameters,
            description: template.description,
        }
    }
}
