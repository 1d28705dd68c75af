//! Ingestion endpoints for the device.
//!
//! The ESP32 posts one reading per request. Each body is validated here,
//! stamped and scored by the alert engine, stored, and then broadcast to
//! observers. Nothing malformed gets past this module.
//!
//! Scoring runs before storage: a reading the engine refuses is never
//! persisted. A storage failure after scoring is logged and answered with
//! 500; the reading stays in its window.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{debug, error, info};

use super::AppState;
use crate::engine::StreamEvent;
use crate::error::{ApiResult, FieldError};
use crate::models::{AudioReading, AudioReadingInput, LightReading, LightReadingInput};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/sensors/bh1750", post(create_light_reading))
        .route("/api/sensors/inmp441", post(create_audio_reading))
}

async fn create_light_reading(
    State(state): State<AppState>,
    payload: Result<Json<LightReadingInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LightReading>)> {
    // ---
    let Json(input) = payload.map_err(body_rejection)?;
    input.validate()?;
    debug!("POST /api/sensors/bh1750 - lux {}", input.lux);

    let (reading, _) = state.engine.ingest_with(|now| input.stamp(now))?;
    state.store.insert_light(&reading).await.inspect_err(|e| {
        error!("BH1750 reading {} was scored but not stored: {}", reading.id, e)
    })?;
    state.engine.publish(StreamEvent::LightReading(reading.clone()));

    info!("Stored BH1750 reading {} ({} lux)", reading.id, reading.lux);
    Ok((StatusCode::CREATED, Json(reading)))
}

async fn create_audio_reading(
    State(state): State<AppState>,
    payload: Result<Json<AudioReadingInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AudioReading>)> {
    // ---
    let Json(input) = payload.map_err(body_rejection)?;
    input.validate()?;
    debug!("POST /api/sensors/inmp441 - {} samples", input.samples.len());

    let (reading, _) = state.engine.ingest_with(|now| input.stamp(now))?;
    state.store.insert_audio(&reading).await.inspect_err(|e| {
        error!("INMP441 reading {} was scored but not stored: {}", reading.id, e)
    })?;
    state.engine.publish(StreamEvent::AudioReading(reading.clone()));

    info!(
        "Stored INMP441 reading {} ({} samples)",
        reading.id,
        reading.samples.len()
    );
    Ok((StatusCode::CREATED, Json(reading)))
}

/// Malformed JSON or wrong field types become a validation error on `body`.
fn body_rejection(rejection: JsonRejection) -> Vec<FieldError> {
    vec![FieldError::new("body", rejection.body_text())]
}
