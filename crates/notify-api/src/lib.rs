//! Notify Platform HTTP API
//!
//! Thin axum boundary over the notification core.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           NOTIFY API (axum)                             │
//! │                                                                         │
//! │  /auth/register   /account/*   /notifications/*   /plan/usage           │
//! │  /templates/:channel                               /health              │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────────┐  │
//! │  │ ApiKeyHeader │  │   ApiJson    │  │ ApiError → HTTP status code  │  │
//! │  └──────┬───────┘  └──────┬───────┘  └──────────────▲───────────────┘  │
//! │         └─────────────────┼─────────────────────────┘                  │
//! │                   ┌───────▼────────┐                                   │
//! │                   │ NotifyUseCases │  (notify-core)                    │
//! │                   └────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

use axum::http::HeaderName;
use axum::routing::get;
use axum::Router;
use notify_core::NotifyUseCases;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use models::*;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn NotifyUseCases>,
    /// Header carrying the api key
    pub api_key_header: HeaderName,
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(routes::account::router())
        .nest("/notifications", routes::notifications::router())
        .route("/plan/usage", get(routes::plan::usage))
        .route("/templates/:channel", get(routes::templates::list_by_channel))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
