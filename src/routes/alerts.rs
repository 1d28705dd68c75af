//! Pull access to the alert registry.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::anomaly::Alert;
use crate::error::{ApiResult, FieldError};
use crate::models::SensorKind;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/alerts", get(list_alerts).delete(clear_alerts))
}

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    sensor: Option<String>,
}

async fn list_alerts(
    Query(params): Query<AlertsQuery>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Alert>>> {
    // ---
    let alerts = match params.sensor.as_deref() {
        None => state.engine.alerts()?,
        Some("light") => state.engine.evaluate(SensorKind::Light)?,
        Some("audio") => state.engine.evaluate(SensorKind::Audio)?,
        Some(_) => {
            return Err(vec![FieldError::new(
                "query.sensor",
                "sensor must be one of: light, audio",
            )]
            .into())
        }
    };
    Ok(Json(alerts))
}

async fn clear_alerts(State(state): State<AppState>) -> ApiResult<StatusCode> {
    // ---
    state.engine.clear()?;
    info!("DELETE /api/alerts - alert registry cleared");
    Ok(StatusCode::NO_CONTENT)
}
