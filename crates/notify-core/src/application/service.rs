//! Notify service
//!
//! Facade wiring the directory, rotator and dispatch pipeline behind
//! [`NotifyUseCases`]. Every collaborator is injected through
//! [`NotifyServiceBuilder`]; nothing is process-global.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::directory::BusinessDirectory;
use super::dispatch::DispatchRouter;
use super::dto::*;
use super::plans::PlanCatalog;
use super::quota::QuotaGate;
use super::rotation::ApiKeyRotator;
use super::usage::UsagePeriodTracker;
use crate::domain::plan::DEFAULT_PLAN_ID;
use crate::domain::value_objects::{ApiKey, Email, Phone};
use crate::domain::{Business, Channel};
use crate::error::{ErrorKind, NotifyError, NotifyResult};
use crate::infrastructure::{LoggingTransport, StoreTemplateCatalog, SystemClock};
use crate::ports::inbound::NotifyUseCases;
use crate::ports::outbound::{
    Clock, EmailTransport, KeyValueStore, SmsTransport, TemplateCatalog, WhatsAppTransport,
};

/// Notification platform service
#[derive(Clone)]
pub struct NotifyService {
    directory: BusinessDirectory,
    rotator: ApiKeyRotator,
    plans: PlanCatalog,
    usage: UsagePeriodTracker,
    gate: QuotaGate,
    router: DispatchRouter,
    templates: Arc<dyn TemplateCatalog>,
    clock: Arc<dyn Clock>,
}

impl NotifyService {
    /// Start building a service over `store`
    pub fn builder(store: Arc<dyn KeyValueStore>) -> NotifyServiceBuilder {
        NotifyServiceBuilder {
            store,
            clock: None,
            templates: None,
            email: None,
            sms: None,
            whatsapp: None,
        }
    }

    /// Resolve an api key to its business.
    ///
    /// Malformed and unknown keys are both `Unauthorized`.
    pub async fn authenticate(&self, api_key: &str) -> NotifyResult<Business> {
        let key = ApiKey::parse(api_key).map_err(|e| NotifyError::Unauthorized(e.to_string()))?;
        match self.directory.get_by_api_key(&key).await {
            Ok(business) => Ok(business),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(api_key = %key, "unknown api key");
                Err(NotifyError::Unauthorized("invalid API key".into()))
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl NotifyUseCases for NotifyService {
    async fn register(&self, command: RegisterCommand) -> NotifyResult<Registration> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(NotifyError::validation("name is required"));
        }
        let email = Email::new(command.email).map_err(|e| NotifyError::validation(e.to_string()))?;
        let phone = Phone::parse(&command.phone).map_err(|e| NotifyError::validation(e.to_string()))?;
        let plan_id = command
            .plan_id
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PLAN_ID.to_string());

        let plan = self.plans.get_by_id(&plan_id).await?;

        // Early, specific answers; the transaction below is the real guard.
        if self.directory.email_exists(&email).await? {
            warn!(email = %email, "registration with taken email");
            return Err(NotifyError::Conflict("email already registered".into()));
        }
        if self.directory.phone_exists(&phone).await? {
            warn!(phone = %phone, "registration with taken phone");
            return Err(NotifyError::Conflict("phone already registered".into()));
        }

        let business = Business::register(name, email, phone, plan.id.clone(), self.clock.now());
        self.directory.create(&business).await?;

        if let Err(e) = self
            .usage
            .open_initial_period(&business.id, &plan.id, plan.period_days)
            .await
        {
            // Rollover opens it lazily on first use.
            warn!(business_id = %business.id, error = %e, "could not open initial usage period");
        }

        info!(business_id = %business.id, plan_id = %plan.id, "business registered");

        Ok(Registration {
            business_id: business.id.to_string(),
            api_key: business.api_key.expose().to_string(),
            plan_id: plan.id,
        })
    }

    async fn rotate_key(&self, command: RotateKeyCommand) -> NotifyResult<RotatedKey> {
        let business = self.authenticate(&command.api_key).await?;
        // A malformed proof cannot match the stored identity.
        let proof = Email::new(command.email).ok().zip(Phone::parse(&command.phone).ok());
        let owns = proof.is_some_and(|(email, phone)| business.owns(&email, &phone));

        if !owns {
            warn!(business_id = %business.id, "key rotation with mismatched email or phone");
            return Err(NotifyError::Unauthorized("email or phone does not match".into()));
        }

        let new_key = ApiKey::generate();
        self.rotator.rotate(&business.id, &business.api_key, &new_key).await?;

        Ok(RotatedKey { api_key: new_key.expose().to_string() })
    }

    async fn get_info(&self, api_key: &str) -> NotifyResult<BusinessInfo> {
        let business = self.authenticate(api_key).await?;
        Ok(BusinessInfo::from(&business))
    }

    async fn dispatch(&self, api_key: &str, request: DispatchRequest) -> NotifyResult<DispatchReceipt> {
        let business = self.authenticate(api_key).await?;
        self.router.dispatch(&business, request).await
    }

    async fn get_usage(&self, api_key: &str) -> NotifyResult<UsageReport> {
        let business = self.authenticate(api_key).await?;
        let (plan, period) = self.gate.snapshot(&business).await?;

        Ok(UsageReport {
            business_id: business.id.to_string(),
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            notification_limit: plan.notification_limit,
            notification_count: period.notification_count,
            notification_left: plan.remaining(period.notification_count),
            period_start: period.period_start,
            period_end: period.period_end,
            period_days: plan.period_days,
        })
    }

    async fn list_templates(&self, api_key: &str, channel: Channel) -> NotifyResult<Vec<TemplateSummary>> {
        self.authenticate(api_key).await?;
        let templates = self.templates.list_active_by_type(channel).await?;
        Ok(templates.into_iter().map(TemplateSummary::from).collect())
    }
}

/// Builder for [`NotifyService`].
///
/// Unset collaborators default to the system clock, templates read from the
/// same store, and transports that only log.
pub struct NotifyServiceBuilder {
    store: Arc<dyn KeyValueStore>,
    clock: Option<Arc<dyn Clock>>,
    templates: Option<Arc<dyn TemplateCatalog>>,
    email: Option<Arc<dyn EmailTransport>>,
    sms: Option<Arc<dyn SmsTransport>>,
    whatsapp: Option<Arc<dyn WhatsAppTransport>>,
}

impl NotifyServiceBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn templates(mut self, templates: Arc<dyn TemplateCatalog>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn email_transport(mut self, transport: Arc<dyn EmailTransport>) -> Self {
        self.email = Some(transport);
        self
    }

    pub fn sms_transport(mut self, transport: Arc<dyn SmsTransport>) -> Self {
        self.sms = Some(transport);
        self
    }

    pub fn whatsapp_transport(mut self, transport: Arc<dyn WhatsAppTransport>) -> Self {
        self.whatsapp = Some(transport);
        self
    }

    pub fn build(self) -> NotifyService {
        let store = self.store;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let templates = self
            .templates
            .unwrap_or_else(|| Arc::new(StoreTemplateCatalog::new(store.clone())));
        let logging = Arc::new(LoggingTransport::default());

        let plans = PlanCatalog::new(store.clone());
        let usage = UsagePeriodTracker::new(store.clone(), clock.clone());
        let gate = QuotaGate::new(plans.clone(), usage.clone());
        let router = DispatchRouter::new(
            gate.clone(),
            templates.clone(),
            self.email.unwrap_or_else(|| logging.clone()),
            self.sms.unwrap_or_else(|| logging.clone()),
            self.whatsapp.unwrap_or_else(|| logging.clone()),
        );

        NotifyService {
            directory: BusinessDirectory::new(store.clone()),
            rotator: ApiKeyRotator::new(store, clock.clone()),
            plans,
            usage,
            gate,
            router,
            templates,
            clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::{fixtures, MockClock, SpyTransport};
    use crate::infrastructure::{seed_plans, seed_templates, InMemoryStore};
    use chrono::Duration;
    use std::collections::HashMap;

    struct Harness {
        service: NotifyService,
        spy: Arc<SpyTransport>,
        clock: Arc<MockClock>,
    }

    async fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        seed_plans(
            store.as_ref(),
            &[fixtures::plan("FREE", 5, 30), fixtures::plan("TRIAL", 3, 7)],
        )
        .await
        .unwrap();
        seed_templates(
            store.as_ref(),
            &[
                fixtures::template("appointment", Channel::WhatsApp, &["name", "date"], "Hi {{1}} on {{2}}"),
                fixtures::template("welcome", Channel::Sms, &["name"], "Welcome $name to $company"),
            ],
        )
        .await
        .unwrap();

        let spy = Arc::new(SpyTransport::new());
        let clock = Arc::new(MockClock::default());
        let service = NotifyService::builder(store)
            .clock(clock.clone())
            .email_transport(spy.clone())
            .sms_transport(spy.clone())
            .whatsapp_transport(spy.clone())
            .build();
        Harness { service, spy, clock }
    }

    fn register_command(email: &str, phone: &str, plan: Option<&str>) -> RegisterCommand {
        RegisterCommand {
            name: "Acme".into(),
            email: email.into(),
            phone: phone.into(),
            plan_id: plan.map(str::to_string),
        }
    }

    fn email_to(to: &str) -> DispatchRequest {
        DispatchRequest::Email(EmailPayload {
            to: to.into(),
            subject: "Hi".into(),
            body: "Hello".into(),
            html: false,
        })
    }

    #[tokio::test]
    async fn test_register_defaults_to_free_and_sends_email() {
        let h = harness().await;
        let registration = h
            .service
            .register(register_command("a@x.com", "+15551234567", None))
            .await
            .unwrap();
        assert_eq!(registration.plan_id, "FREE");
        assert!(registration.api_key.starts_with("nfy_"));

        let receipt = h
            .service
            .dispatch(&registration.api_key, email_to("b@y.com"))
            .await
            .unwrap();
        assert_eq!(receipt.notification_count, 1);
        assert_eq!(receipt.notification_left, 4);

        let usage = h.service.get_usage(&registration.api_key).await.unwrap();
        assert_eq!(usage.notification_count, 1);
        assert_eq!(usage.notification_left, 4);
        assert_eq!(usage.period_days, 30);
        assert_eq!(usage.business_id, registration.business_id);
    }

    #[tokio::test]
    async fn test_register_validation_and_unknown_plan() {
        let h = harness().await;
        let cases = [
            (register_command("nope", "+15551234567", None), ErrorKind::Validation),
            (register_command("a@x.com", "5551234567", None), ErrorKind::Validation),
            (register_command("a@x.com", "+15551234567", Some("GOLD")), ErrorKind::NotFound),
        ];
        for (command, kind) in cases {
            assert_eq!(h.service.register(command).await.unwrap_err().kind(), kind);
        }
    }

    #[tokio::test]
    async fn test_taken_email_conflicts_regardless_of_phone() {
        let h = harness().await;
        h.service
            .register(register_command("a@x.com", "+15551234567", None))
            .await
            .unwrap();

        for phone in ["+15551234567", "+15557654321"] {
            let err = h
                .service
                .register(register_command(" A@x.COM ", phone, None))
                .await
                .unwrap_err();
            assert_eq!(err, NotifyError::Conflict("email already registered".into()));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_registration_has_one_winner() {
        let h = harness().await;
        let mut handles = Vec::new();
        for i in 0..2 {
            let service = h.service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .register(register_command("a@x.com", &format!("+1555123456{}", i), None))
                    .await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn test_rotation_invalidates_old_key() {
        let h = harness().await;
        let registration = h
            .service
            .register(register_command("a@x.com", "+15551234567", None))
            .await
            .unwrap();

        let rotated = h
            .service
            .rotate_key(RotateKeyCommand {
                api_key: registration.api_key.clone(),
                email: "A@X.com".into(),
                phone: "+1 555-123-4567".into(),
            })
            .await
            .unwrap();
        assert_ne!(rotated.api_key, registration.api_key);

        let err = h
            .service
            .dispatch(&registration.api_key, email_to("b@y.com"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        assert!(h.service.dispatch(&rotated.api_key, email_to("b@y.com")).await.is_ok());
        let info = h.service.get_info(&rotated.api_key).await.unwrap();
        assert_eq!(info.business_id, registration.business_id);
    }

    #[tokio::test]
    async fn test_rotation_requires_matching_identity() {
        let h = harness().await;
        let registration = h
            .service
            .register(register_command("a@x.com", "+15551234567", None))
            .await
            .unwrap();

        let proofs = [
            ("a@x.com", "+15550000000"),
            ("not-an-email", "+15551234567"),
            ("a@x.com", "5551234567"),
        ];
        for (email, phone) in proofs {
            let err = h
                .service
                .rotate_key(RotateKeyCommand {
                    api_key: registration.api_key.clone(),
                    email: email.into(),
                    phone: phone.into(),
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthorized, "{} {}", email, phone);
        }
        assert!(h.service.get_info(&registration.api_key).await.is_ok());
    }

    #[tokio::test]
    async fn test_quota_counts_down_then_blocks_transport() {
        let h = harness().await;
        let registration = h
            .service
            .register(register_command("a@x.com", "+15551234567", Some("TRIAL")))
            .await
            .unwrap();

        let mut left = Vec::new();
        for _ in 0..3 {
            let receipt = h
                .service
                .dispatch(&registration.api_key, email_to("b@y.com"))
                .await
                .unwrap();
            left.push(receipt.notification_left);
        }
        assert_eq!(left, vec![2, 1, 0]);

        let err = h
            .service
            .dispatch(&registration.api_key, email_to("b@y.com"))
            .await
            .unwrap_err();
        assert_eq!(err, NotifyError::QuotaExceeded { limit: 3 });
        assert_eq!(h.spy.count(), 3);
    }

    #[tokio::test]
    async fn test_expired_period_resets_allowance() {
        let h = harness().await;
        let registration = h
            .service
            .register(register_command("a@x.com", "+15551234567", Some("TRIAL")))
            .await
            .unwrap();
        for _ in 0..3 {
            h.service
                .dispatch(&registration.api_key, email_to("b@y.com"))
                .await
                .unwrap();
        }

        h.clock.advance(Duration::days(7));
        let usage = h.service.get_usage(&registration.api_key).await.unwrap();
        assert_eq!(usage.notification_count, 0);
        assert_eq!(usage.period_start, h.clock.now());

        let receipt = h
            .service
            .dispatch(&registration.api_key, email_to("b@y.com"))
            .await
            .unwrap();
        assert_eq!(receipt.notification_left, 2);
    }

    #[tokio::test]
    async fn test_whatsapp_missing_parameter_is_validation() {
        let h = harness().await;
        let registration = h
            .service
            .register(register_command("a@x.com", "+15551234567", None))
            .await
            .unwrap();

        let parameters: HashMap<String, String> = [("name".to_string(), "Joe".to_string())].into();
        let err = h
            .service
            .dispatch(
                &registration.api_key,
                DispatchRequest::WhatsApp(TemplatePayload {
                    to: "+15550001111".into(),
                    template_id: "appointment".into(),
                    parameters,
                }),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("date"));
        assert_eq!(h.spy.count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_keys_are_unauthorized() {
        let h = harness().await;
        for key in ["", "abc", "nfy_doesnotexist"] {
            let err = h.service.get_info(key).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthorized, "key {:?}", key);
        }
    }

    #[tokio::test]
    async fn test_list_templates_by_channel() {
        let h = harness().await;
        let registration = h
            .service
            .register(register_command("a@x.com", "+15551234567", None))
            .await
            .unwrap();

        let sms = h
            .service
            .list_templates(&registration.api_key, Channel::Sms)
            .await
            .unwrap();
        assert_eq!(sms.len(), 1);
        assert_eq!(sms[0].id, "welcome");

        let err = h.service.list_templates("nfy_unknown_key", Channel::Sms).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}
