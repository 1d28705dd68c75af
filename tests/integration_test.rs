//! Smoke tests against a running server (`BASE_URL`, default
//! `http://localhost:8080`). Run with `cargo test -- --ignored`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct LightReading {
    id: String,
    timestamp: DateTime<Utc>,
    lux: f64,
}

#[derive(Debug, Deserialize)]
struct Alert {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    severity: String,
    timestamp: DateTime<Utc>,
}

fn base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn ingest_and_query_light() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();

    let created: LightReading = client
        .post(format!("{}/api/sensors/bh1750", base))
        .json(&json!({ "lux": 321.5 }))
        .send()
        .await?
        .json()
        .await?;

    assert!(!created.id.is_empty(), "id should not be empty");
    assert_eq!(created.lux, 321.5);

    let url = format!("{}/api/readings/bh1750?limit=50", base);
    let readings: Vec<LightReading> = client.get(&url).send().await?.json().await?;

    assert!(!readings.is_empty(), "No readings returned from {}", url);
    assert!(readings.len() <= 50, "Limit filter failed");

    // Newest first
    for pair in readings.windows(2) {
        assert!(
            pair[0].timestamp >= pair[1].timestamp,
            "Readings out of order: {} before {}",
            pair[0].timestamp,
            pair[1].timestamp
        );
    }

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn invalid_reading_is_rejected() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();

    let status = client
        .post(format!("{}/api/sensors/inmp441", base))
        .json(&json!({ "samples": [] }))
        .send()
        .await?
        .status();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn alerts_are_well_formed() -> Result<()> {
    // ---
    let base = base_url();
    let client = Client::new();

    let alerts: Vec<Alert> = client
        .get(format!("{}/api/alerts", base))
        .send()
        .await?
        .json()
        .await?;

    assert!(alerts.len() <= 10, "Registry exceeded its cap");
    for alert in &alerts {
        assert!(
            alert.id.ends_with(&alert.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
            "Alert id {} does not carry its timestamp",
            alert.id
        );
        assert!(
            ["info", "warning", "critical"].contains(&alert.severity.as_str()),
            "Unknown severity {} on {}",
            alert.severity,
            alert.kind
        );
    }

    Ok(())
}
