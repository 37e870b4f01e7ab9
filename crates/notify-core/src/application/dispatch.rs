//! Dispatch router
//!
//! Per channel: admit through the quota gate, validate, hand over to the
//! transport, and count the send only if the transport accepted it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

use super::dto::{DispatchReceipt, DispatchRequest, EmailPayload, SmsPayload, TemplatePayload};
use super::quota::QuotaGate;
use crate::domain::value_objects::{Email, Phone};
use crate::domain::{Business, Channel, Template};
use crate::error::{NotifyError, NotifyResult};
use crate::ports::outbound::{
    EmailMessage, EmailTransport, SmsMessage, SmsTransport, TemplateCatalog, WhatsAppMessage,
    WhatsAppTransport,
};

/// Longest SMS body accepted, in characters
pub const MAX_SMS_CHARS: usize = 1600;
/// Parameter filled with the business name in SMS templates
pub const COMPANY_PARAM: &str = "company";
/// Parameter holding a verification code
pub const CODE_PARAM: &str = "code";

/// Validated message, ready for a transport
#[derive(Debug)]
enum Outbound {
    Email(EmailMessage),
    Sms(SmsMessage),
    WhatsApp(WhatsAppMessage),
}

#[derive(Debug)]
struct Prepared {
    outbound: Outbound,
    template_used: Option<String>,
    extra_parameters: Vec<String>,
}

impl Prepared {
    fn plain(outbound: Outbound) -> Self {
        Self { outbound, template_used: None, extra_parameters: Vec::new() }
    }
}

/// Channel router
#[derive(Clone)]
pub struct DispatchRouter {
    gate: QuotaGate,
    templates: Arc<dyn TemplateCatalog>,
    email: Arc<dyn EmailTransport>,
    sms: Arc<dyn SmsTransport>,
    whatsapp: Arc<dyn WhatsAppTransport>,
}

impl DispatchRouter {
    pub fn new(
        gate: QuotaGate,
        templates: Arc<dyn TemplateCatalog>,
        email: Arc<dyn EmailTransport>,
        sms: Arc<dyn SmsTransport>,
        whatsapp: Arc<dyn WhatsAppTransport>,
    ) -> Self {
        Self { gate, templates, email, sms, whatsapp }
    }

    /// Send one notification for an authenticated business
    pub async fn dispatch(
        &self,
        business: &Business,
        request: DispatchRequest,
    ) -> NotifyResult<DispatchReceipt> {
        let channel = request.channel();
        let ticket = self.gate.admit(business).await?;
        let prepared = self.prepare(business, request).await?;

        let delivered = match &prepared.outbound {
            Outbound::Email(message) => self.email.send_email(message).await,
            Outbound::Sms(message) => self.sms.send_sms(message).await,
            Outbound::WhatsApp(message) => self.whatsapp.send_whatsapp(message).await,
        };
        let delivered = delivered.map_err(|e| {
            warn!(business_id = %business.id, %channel, error = %e, "transport rejected notification");
            NotifyError::from(e)
        })?;

        self.gate.record_send(&ticket).await;

        info!(
            business_id = %business.id,
            %channel,
            message_id = %delivered.message_id,
            template = prepared.template_used.as_deref().unwrap_or("-"),
            "notification sent"
        );

        Ok(DispatchReceipt {
            notification_id: delivered.message_id,
            notification_count: ticket.count_after_send(),
            notification_left: ticket.remaining_after_send(),
            template_used: prepared.template_used,
            extra_parameters: prepared.extra_parameters,
        })
    }

    async fn prepare(&self, business: &Business, request: DispatchRequest) -> NotifyResult<Prepared> {
        match request {
            DispatchRequest::Email(payload) => prepare_email(business, payload).map(Prepared::plain),
            DispatchRequest::Sms(payload) => prepare_sms(payload).map(Prepared::plain),
            DispatchRequest::SmsTemplate(payload) => self.prepare_sms_template(business, payload).await,
            DispatchRequest::WhatsApp(payload) => self.prepare_whatsapp(payload).await,
        }
    }

    async fn prepare_sms_template(
        &self,
        business: &Business,
        payload: TemplatePayload,
    ) -> NotifyResult<Prepared> {
        let to = parse_phone(&payload.to)?;
        let template = self.resolve_template(&payload.template_id, Channel::Sms).await?;

        let mut values = payload.parameters;
        let caller_set_company = values.contains_key(COMPANY_PARAM);
        values.insert(COMPANY_PARAM.to_string(), business.name.clone());

        let mut extra = require_parameters(&template, &values)?;
        if !caller_set_company {
            extra.retain(|name| name != COMPANY_PARAM);
        }

        if template.parameters.iter().any(|p| p == CODE_PARAM) {
            let code = values.get(CODE_PARAM).map(String::as_str).unwrap_or_default();
            if !is_verification_code(code) {
                return Err(NotifyError::validation(
                    "invalid verification code format: expected 4 to 6 digits",
                ));
            }
        }

        let body = template.render(&values);
        check_sms_length(&body)?;

        Ok(Prepared {
            outbound: Outbound::Sms(SmsMessage { to, body }),
            template_used: Some(template.name),
            extra_parameters: extra,
        })
    }

    async fn prepare_whatsapp(&self, payload: TemplatePayload) -> NotifyResult<Prepared> {
        let to = parse_phone(&payload.to)?;
        let template = self.resolve_template(&payload.template_id, Channel::WhatsApp).await?;
        let extra = require_parameters(&template, &payload.parameters)?;

        if template.external_id.is_empty() {
            warn!(template_id = %template.id, "whatsapp template has no content id");
            return Err(NotifyError::ServiceUnavailable("template configuration".into()));
        }

        // Positional, 1-indexed, in declaration order.
        let variables: BTreeMap<String, String> = template
            .parameters
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                payload.parameters.get(name).map(|v| ((i + 1).to_string(), v.clone()))
            })
            .collect();

        Ok(Prepared {
            outbound: Outbound::WhatsApp(WhatsAppMessage {
                to,
                content_id: template.external_id,
                variables,
            }),
            template_used: Some(template.name),
            extra_parameters: extra,
        })
    }

    /// Template must exist, match the channel and be active
    async fn resolve_template(&self, template_id: &str, channel: Channel) -> NotifyResult<Template> {
        if template_id.trim().is_empty() {
            return Err(NotifyError::validation("templateId is required"));
        }

        let template = self
            .templates
            .get_template(template_id)
            .await?
            .ok_or_else(|| NotifyError::NotFound(format!("template {}", template_id)))?;

        if template.channel != channel {
            return Err(NotifyError::Validation(format!(
                "invalid template type: {} is a {} template",
                template_id, template.channel
            )));
        }

        if !template.active {
            return Err(NotifyError::NotFound(format!("template {}", template_id)));
        }

        Ok(template)
    }
}

fn prepare_email(business: &Business, payload: EmailPayload) -> NotifyResult<Outbound> {
    let to = Email::new(payload.to).map_err(|e| NotifyError::validation(e.to_string()))?;
    if payload.subject.trim().is_empty() {
        return Err(NotifyError::validation("subject is required"));
    }
    if payload.body.trim().is_empty() {
        return Err(NotifyError::validation("body is required"));
    }

    Ok(Outbound::Email(EmailMessage {
        to,
        subject: payload.subject,
        body: payload.body,
        html: payload.html,
        from_name: business.name.clone(),
    }))
}

fn prepare_sms(payload: SmsPayload) -> NotifyResult<Outbound> {
    let to = parse_phone(&payload.to)?;
    if payload.message.trim().is_empty() {
        return Err(NotifyError::validation("message is required"));
    }
    check_sms_length(&payload.message)?;
    Ok(Outbound::Sms(SmsMessage { to, body: payload.message }))
}

fn parse_phone(raw: &str) -> NotifyResult<Phone> {
    Phone::parse(raw).map_err(|e| NotifyError::validation(e.to_string()))
}

fn check_sms_length(body: &str) -> NotifyResult<()> {
    if body.chars().count() > MAX_SMS_CHARS {
        return Err(NotifyError::Validation(format!(
            "message too long (max {} characters)",
            MAX_SMS_CHARS
        )));
    }
    Ok(())
}

/// Fails on missing declared parameters; returns the ignored extras
fn require_parameters(
    template: &Template,
    supplied: &HashMap<String, String>,
) -> NotifyResult<Vec<String>> {
    let check = template.check_parameters(supplied);
    if !check.is_complete() {
        return Err(NotifyError::Validation(format!(
            "missing required parameters: {}",
            check.missing.join(", ")
        )));
    }
    Ok(check.extra)
}

fn is_verification_code(code: &str) -> bool {
    (4..=6).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit())
}
