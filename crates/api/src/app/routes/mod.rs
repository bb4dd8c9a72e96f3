use axum::{routing::post, Router};

pub mod events;
pub mod inventory;
pub mod system;

/// Router for the inventory and event-tracking endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/inventory", inventory::router())
        .route("/events", post(events::track_event))
}
