//! Alert records produced by the classifier.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SensorKind;

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    LightSpike,
    LightDrop,
    LightAbnormal,
    NoiseSpike,
    NoiseOutlier,
}

impl AlertKind {
    /// Prefix of the alert id.
    pub fn slug(&self) -> &'static str {
        // ---
        match self {
            AlertKind::LightSpike => "light-spike",
            AlertKind::LightDrop => "light-drop",
            AlertKind::LightAbnormal => "light-high",
            AlertKind::NoiseSpike => "noise-spike",
            AlertKind::NoiseOutlier => "noise-outlier",
        }
    }

    pub fn sensor(&self) -> SensorKind {
        // ---
        match self {
            AlertKind::LightSpike | AlertKind::LightDrop | AlertKind::LightAbnormal => {
                SensorKind::Light
            }
            AlertKind::NoiseSpike | AlertKind::NoiseOutlier => SensorKind::Audio,
        }
    }
}

/// Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    // ---
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: Severity,
        timestamp: DateTime<Utc>,
        title: impl Into<String>,
        message: impl Into<String>,
        value: Option<f64>,
    ) -> Self {
        // ---
        Self {
            id: alert_id(kind, timestamp),
            kind,
            severity,
            title: title.into(),
            message: message.into(),
            timestamp,
            value,
        }
    }
}

/// Stable identity of an alert: the same kind raised for the same reading
/// always gets the same id, e.g. `light-spike-2024-01-15T10:30:00.000Z`.
pub fn alert_id(kind: AlertKind, timestamp: DateTime<Utc>) -> String {
    // ---
    format!(
        "{}-{}",
        kind.slug(),
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_alert_id_format() {
        // ---
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(
            alert_id(AlertKind::LightSpike, ts),
            "light-spike-2024-01-15T10:30:00.000Z"
        );
        assert_eq!(
            alert_id(AlertKind::LightAbnormal, ts),
            "light-high-2024-01-15T10:30:00.000Z"
        );
    }

    #[test]
    fn test_severity_ordering() {
        // ---
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_alert_json_shape() {
        // ---
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let alert = Alert::new(
            AlertKind::NoiseOutlier,
            Severity::Critical,
            ts,
            "Extreme noise detected",
            "peak 35000",
            Some(35000.0),
        );

        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "NOISE_OUTLIER");
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["id"], "noise-outlier-2024-01-15T10:30:00.000Z");
        assert_eq!(json["value"], 35000.0);
    }
}
