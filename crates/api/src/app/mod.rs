//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, engine and recorder wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{error_handling::HandleErrorLayer, routing::get, Extension, Router};
use chrono::Utc;
use tower::ServiceBuilder;

use stockroom_infra::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Loads the initial stock from the configured seed file (or the demo
/// catalogue) and starts the background event consumer.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let records = config
        .load_stock(Utc::now())
        .context("failed to load initial stock")?;
    tracing::info!(products = records.len(), "stock ledger seeded");

    let services = Arc::new(AppServices::in_memory(config, records));
    services.spawn_event_logger();

    Ok(router_with(services, config.request_timeout))
}

/// Router over already-wired services.
pub fn router_with(services: Arc<AppServices>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(errors::handle_middleware_error))
                .timeout(request_timeout),
        )
}
