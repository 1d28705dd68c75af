use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::error::{ApiResult, FieldError};
use crate::models::{AudioReading, LightReading};
use crate::store::{Order, ReadingQuery};

// ---

/// Largest page a client may request.
const MAX_LIMIT: u32 = 10_000;

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/readings/bh1750", get(light_readings))
        .route("/api/readings/inmp441", get(audio_readings))
}

async fn light_readings(
    Query(params): Query<ReadingsParams>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<LightReading>>> {
    // ---
    let query = params.into_query()?;
    let readings = state.store.light_readings(&query).await?;
    info!("GET /api/readings/bh1750 - returning {} readings", readings.len());
    Ok(Json(readings))
}

async fn audio_readings(
    Query(params): Query<ReadingsParams>,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AudioReading>>> {
    // ---
    let query = params.into_query()?;
    let readings = state.store.audio_readings(&query).await?;
    info!("GET /api/readings/inmp441 - returning {} readings", readings.len());
    Ok(Json(readings))
}

/// Query parameters for historical readings
///
/// Dates are RFC 3339 (e.g. `2024-01-01T00:00:00Z`); results come back
/// newest first.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingsParams {
    start_date: Option<String>,
    end_date: Option<String>,
    limit: Option<String>,
}

impl ReadingsParams {
    /// Validate every parameter, reporting all problems at once.
    fn into_query(self) -> Result<ReadingQuery, Vec<FieldError>> {
        // ---
        let mut errors = Vec::new();

        let start = parse_date(self.start_date.as_deref(), "query.startDate", &mut errors);
        let end = parse_date(self.end_date.as_deref(), "query.endDate", &mut errors);

        let limit = match self.limit.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if (1..=MAX_LIMIT).contains(&n) => Some(n),
                Ok(_) => {
                    errors.push(FieldError::new(
                        "query.limit",
                        format!("limit must be between 1 and {MAX_LIMIT}"),
                    ));
                    None
                }
                Err(_) => {
                    errors.push(FieldError::new("query.limit", "limit must be a positive integer"));
                    None
                }
            },
        };

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                errors.push(FieldError::new(
                    "query.startDate",
                    "startDate must not be after endDate",
                ));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ReadingQuery {
            start,
            end,
            limit,
            order: Order::NewestFirst,
        })
    }
}

fn parse_date(raw: Option<&str>, path: &str, errors: &mut Vec<FieldError>) -> Option<DateTime<Utc>> {
    // ---
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => {
            let field = path.trim_start_matches("query.");
            errors.push(FieldError::new(path, format!("{field} must be a valid date string")));
            None
        }
    }
}
