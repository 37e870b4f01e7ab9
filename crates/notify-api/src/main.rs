//! Notify API server

use anyhow::Context;
use axum::http::HeaderName;
use notify_api::config::Settings;
use notify_api::{build_router, AppState};
use notify_core::infrastructure::{seed_plans, seed_templates};
use notify_core::{InMemoryStore, LoggingTransport, NotifyService};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("loading settings")?;
    let api_key_header = HeaderName::try_from(settings.auth.api_key_header.as_str())
        .context("invalid auth.api_key_header")?;

    let store = Arc::new(InMemoryStore::new());
    let now = chrono::Utc::now();
    seed_plans(store.as_ref(), &settings.catalog.plans(now)).await?;
    seed_templates(store.as_ref(), &settings.catalog.templates(now)).await?;

    let transport = Arc::new(LoggingTransport::new(settings.sender.from_address.clone()));
    let service = NotifyService::builder(store)
        .email_transport(transport.clone())
        .sms_transport(transport.clone())
        .whatsapp_transport(transport)
        .build();

    let app = build_router(AppState { service: Arc::new(service), api_key_header });

    let listener = tokio::net::TcpListener::bind(&settings.server.bind)
        .await
        .with_context(|| format!("binding {}", settings.server.bind))?;
    tracing::info!("Notify API listening on {}", settings.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
