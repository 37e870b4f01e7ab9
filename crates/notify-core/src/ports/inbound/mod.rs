//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: what the boundary layer may ask of the core.

use async_trait::async_trait;

use crate::application::dto::*;
use crate::domain::Channel;
use crate::error::NotifyResult;

/// Notification platform use cases
#[async_trait]
pub trait NotifyUseCases: Send + Sync {
    /// Register a business; fails `Conflict` on a taken email or phone
    async fn register(&self, command: RegisterCommand) -> NotifyResult<Registration>;

    /// Replace the api key after proving ownership with email and phone
    async fn rotate_key(&self, command: RotateKeyCommand) -> NotifyResult<RotatedKey>;

    /// Account details for an api key
    async fn get_info(&self, api_key: &str) -> NotifyResult<BusinessInfo>;

    /// Send one notification, gated by quota
    async fn dispatch(&self, api_key: &str, request: DispatchRequest) -> NotifyResult<DispatchReceipt>;

    /// Current period usage against the plan
    async fn get_usage(&self, api_key: &str) -> NotifyResult<UsageReport>;

    /// Active templates of one channel
    async fn list_templates(&self, api_key: &str, channel: Channel) -> NotifyResult<Vec<TemplateSummary>>;
}
