use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::engine::AlertEngine;
use crate::store::ReadingStore;

mod alerts;
mod events;
mod health;
mod readings;
mod sensors;

// ---

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
    pub engine: Arc<AlertEngine>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReadingStore>, engine: Arc<AlertEngine>) -> Self {
        Self { store, engine }
    }
}

/// Every endpoint, with request tracing and a permissive CORS policy so the
/// browser dashboard can be served from another origin.
pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(sensors::router())
        .merge(readings::router())
        .merge(alerts::router())
        .merge(events::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
