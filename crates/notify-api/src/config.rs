//! Service configuration
//!
//! Layered: built-in defaults, then an optional file (`NOTIFY_CONFIG`,
//! default `config/notify.json`), then `NOTIFY__`-prefixed environment
//! variables with `__` between path segments, e.g.
//! `NOTIFY__SERVER__BIND=0.0.0.0:9000`.

use chrono::{DateTime, Utc};
use ::config::{Config, ConfigError, Environment, File};
use notify_core::{Channel, Plan, Template};
use serde::{Deserialize, Serialize};

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "config/notify.json";

/// Service settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub catalog: CatalogSettings,
    pub sender: SenderSettings,
}

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: "0.0.0.0:8080".into() }
    }
}

/// Authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Header carrying the api key
    pub api_key_header: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self { api_key_header: "X-API-Key".into() }
    }
}

/// Plans and templates written to the store at startup.
///
/// Keys are snake_case: the config crate folds keys to lower case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub plans: Vec<PlanEntry>,
    pub templates: Vec<TemplateEntry>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            plans: vec![PlanEntry {
                id: "FREE".into(),
                name: "Free".into(),
                notification_limit: 100,
                period_days: 30,
                price: 0.0,
                description: "Starter allowance".into(),
                active: true,
            }],
            templates: Vec::new(),
        }
    }
}

impl CatalogSettings {
    pub fn plans(&self, now: DateTime<Utc>) -> Vec<Plan> {
        self.plans.iter().map(|p| p.to_plan(now)).collect()
    }

    pub fn templates(&self, now: DateTime<Utc>) -> Vec<Template> {
        self.templates.iter().map(|t| t.to_template(now)).collect()
    }
}

/// Plan as written in config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    pub id: String,
    pub name: String,
    pub notification_limit: u64,
    pub period_days: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "enabled")]
    pub active: bool,
}

impl PlanEntry {
    fn to_plan(&self, now: DateTime<Utc>) -> Plan {
        Plan {
            id: self.id.clone(),
            name: self.name.clone(),
            notification_limit: self.notification_limit,
            period_days: self.period_days,
            price: self.price,
            description: self.description.clone(),
            active: self.active,
            created_at: now,
        }
    }
}

/// Template as written in config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub channel: Channel,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "enabled")]
    pub active: bool,
}

impl TemplateEntry {
    fn to_template(&self, now: DateTime<Utc>) -> Template {
        Template {
            id: self.id.clone(),
            name: self.name.clone(),
            channel: self.channel,
            provider: self.provider.clone(),
            external_id: self.external_id.clone(),
            parameters: self.parameters.clone(),
            description: self.description.clone(),
            active: self.active,
            created_at: now,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Outbound sender identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderSettings {
    /// Address emails are sent from; the display name is the business name
    pub from_address: String,
}

impl Default for SenderSettings {
    fn default() -> Self {
        Self { from_address: "no-reply@notify.local".into() }
    }
}

impl Settings {
    /// Load settings from the layered sources
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("NOTIFY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("NOTIFY").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::load_from("does/not/exist.json").unwrap();
        assert_eq!(settings.auth.api_key_header, "X-API-Key");
        let plans = settings.catalog.plans(Utc::now());
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].id, "FREE");
        assert!(plans[0].active);
    }
}
