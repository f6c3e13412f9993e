//! HTTP/RPC and WebSocket surface wiring.

pub mod http;
pub mod ws;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::metrics::Metrics;
use crate::town::TownsStore;

/// Shared handles every request handler needs. Cheap to clone: everything
/// inside is already an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub towns: Arc<TownsStore>,
    pub metrics: Arc<Metrics>,
}

/// Assembles the full router. CORS and connection-info layers are added by
/// the caller (`main.rs`) so this stays test-friendly without a real listener.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/towns", post(http::create_town).get(http::list_towns))
        .route(
            "/towns/{town_id}",
            patch(http::update_town).delete(http::delete_town),
        )
        .route("/towns/{town_id}/sessions", post(http::join_town))
        .route(
            "/towns/{town_id}/conversation-areas",
            post(http::create_conversation_area),
        )
        .route("/towns/{town_id}/subscribe", get(ws::subscribe_handler))
        .route("/health", get(http::health))
        .route("/metrics", get(http::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
