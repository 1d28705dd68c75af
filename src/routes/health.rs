// src/routes/health.rs
//! API health check endpoint for the coopwatch backend.
//!
//! This module defines the `/health` route used by container orchestrators
//! (e.g., Docker, Kubernetes) and the device firmware to verify that the
//! service is up. Besides the liveness flag it reports how full the sensor
//! windows are and how many alerts are active, which is enough to tell
//! "running but still warming up" from "running and scoring".
//!
//! It does not touch the database.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;
use crate::engine::EngineStatus;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    engine: Option<EngineStatus>,
}

/// Handle `GET /health`.
///
/// Reports `degraded` when the engine state cannot be read, which only
/// happens after a panic while a lock was held.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    // ---
    match state.engine.status() {
        Ok(engine) => Json(HealthResponse {
            status: "ok",
            engine: Some(engine),
        }),
        Err(e) => {
            tracing::error!("Health check: {}", e);
            Json(HealthResponse {
                status: "degraded",
                engine: None,
            })
        }
    }
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
