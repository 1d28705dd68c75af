//! Per-sensor alert rules.
//!
//! Each rule scores the window's latest observation (the candidate) against
//! the observations that arrived before it. Statistical rules use a z-score
//! against the trailing mean; the absolute ceilings ignore statistics and may
//! fire together with them for the same reading.
//!
//! | kind             | fires when                                   | severity            |
//! |------------------|----------------------------------------------|---------------------|
//! | `LIGHT_SPIKE`    | `lux > mean + k·std` and `z > k`             | warning             |
//! | `LIGHT_DROP`     | `lux < mean − k·std` and `z > k`             | critical            |
//! | `LIGHT_ABNORMAL` | `lux > light_max_lux`                        | warning             |
//! | `NOISE_SPIKE`    | `z > noise_spike_z`                          | critical if `z > noise_outlier_z` |
//! | `NOISE_OUTLIER`  | `peak > noise_max_amplitude`                 | critical            |

use crate::config::DetectionConfig;
use crate::models::SensorKind;

use super::alert::{Alert, AlertKind, Severity};
use super::stats::{stats, z_score};
use super::window::{Observation, WindowSnapshot};

// ---

/// Applies the detection rules using one immutable set of thresholds.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: DetectionConfig,
}

impl Classifier {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Alerts for the candidate of one sensor's window.
    ///
    /// Returns nothing while the history is shorter than `min_samples`.
    pub fn evaluate(&self, kind: SensorKind, window: &WindowSnapshot) -> Vec<Alert> {
        // ---
        let Some(latest) = window.latest else {
            return Vec::new();
        };
        if window.history.len() < self.config.min_samples {
            return Vec::new();
        }

        match kind {
            SensorKind::Light => self.light_alerts(latest, &window.history),
            SensorKind::Audio => self.audio_alerts(latest, &window.history),
        }
    }

    /// One evaluation pass over both sensors: light alerts first, then audio,
    /// keeping the most recent `alert_cap`.
    pub fn evaluate_pass(&self, light: &WindowSnapshot, audio: &WindowSnapshot) -> Vec<Alert> {
        // ---
        let mut alerts = self.evaluate(SensorKind::Light, light);
        alerts.extend(self.evaluate(SensorKind::Audio, audio));

        let excess = alerts.len().saturating_sub(self.config.alert_cap);
        alerts.drain(..excess);
        alerts
    }

    fn light_alerts(&self, latest: Observation, history: &[f64]) -> Vec<Alert> {
        // ---
        let cfg = &self.config;
        let s = stats(history);
        let z = z_score(latest.value, s.mean, s.std);
        let lux = latest.value;
        let mut alerts = Vec::new();

        if lux > s.mean + cfg.light_spike_z * s.std && z > cfg.light_spike_z {
            alerts.push(Alert::new(
                AlertKind::LightSpike,
                Severity::Warning,
                latest.timestamp,
                "Light spike detected",
                format!(
                    "Abnormal light level: {lux:.1} lux (average: {:.1} lux). Possible intrusion or lighting fault.",
                    s.mean
                ),
                Some(lux),
            ));
        }

        if lux < s.mean - cfg.light_drop_z * s.std && z > cfg.light_drop_z {
            alerts.push(Alert::new(
                AlertKind::LightDrop,
                Severity::Critical,
                latest.timestamp,
                "Critical light drop",
                format!(
                    "Light level very low: {lux:.1} lux (average: {:.1} lux). Check the lighting system.",
                    s.mean
                ),
                Some(lux),
            ));
        }

        if lux > cfg.light_max_lux {
            alerts.push(Alert::new(
                AlertKind::LightAbnormal,
                Severity::Warning,
                latest.timestamp,
                "Excessive light",
                format!("Light level above expected range: {lux:.1} lux. Check the light controller."),
                Some(lux),
            ));
        }

        alerts
    }

    fn audio_alerts(&self, latest: Observation, history: &[f64]) -> Vec<Alert> {
        // ---
        let cfg = &self.config;
        let s = stats(history);
        let z = z_score(latest.value, s.mean, s.std);
        let peak = latest.value;
        let mut alerts = Vec::new();

        if z > cfg.noise_spike_z {
            let (severity, title) = if z > cfg.noise_outlier_z {
                (Severity::Critical, "Critical noise detected")
            } else {
                (Severity::Warning, "Elevated noise")
            };
            alerts.push(Alert::new(
                AlertKind::NoiseSpike,
                severity,
                latest.timestamp,
                title,
                format!(
                    "Abnormal noise level: {peak:.0} (average: {:.0}). Possible flock stress or predator.",
                    s.mean
                ),
                Some(peak),
            ));
        }

        if peak > cfg.noise_max_amplitude {
            alerts.push(Alert::new(
                AlertKind::NoiseOutlier,
                Severity::Critical,
                latest.timestamp,
                "Extreme noise detected",
                format!("Extremely high amplitude: {peak:.0}. Inspect the coop immediately."),
                Some(peak),
            ));
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn window(history: &[f64], candidate: f64) -> WindowSnapshot {
        WindowSnapshot {
            history: history.to_vec(),
            latest: Some(Observation {
                timestamp: ts(history.len() as i64),
                value: candidate,
            }),
        }
    }

    fn kinds(alerts: &[Alert]) -> Vec<AlertKind> {
        alerts.iter().map(|a| a.kind).collect()
    }

    fn classifier() -> Classifier {
        Classifier::new(DetectionConfig::default())
    }

    #[test]
    fn test_light_spike() {
        // ---
        let alerts = classifier().evaluate(
            SensorKind::Light,
            &window(&[100.0, 102.0, 98.0, 101.0, 99.0], 500.0),
        );
        assert_eq!(kinds(&alerts), vec![AlertKind::LightSpike]);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(alerts[0].value, Some(500.0));
    }

    #[test]
    fn test_light_drop_is_critical() {
        // ---
        let alerts = classifier().evaluate(
            SensorKind::Light,
            &window(&[300.0, 305.0, 295.0, 302.0, 298.0], 2.0),
        );
        assert_eq!(kinds(&alerts), vec![AlertKind::LightDrop]);
        assert_eq!(alerts[0].severity, Severity::Critical);
    }

    #[test]
    fn test_light_abnormal_without_spike() {
        // ---
        // High but steady light: no statistical spike, ceiling still fires
        let alerts = classifier().evaluate(
            SensorKind::Light,
            &window(&[1400.0, 1600.0, 1500.0, 1450.0, 1550.0], 1500.0),
        );
        assert_eq!(kinds(&alerts), vec![AlertKind::LightAbnormal]);
    }

    #[test]
    fn test_light_abnormal_cofires_with_spike() {
        // ---
        let alerts = classifier().evaluate(
            SensorKind::Light,
            &window(&[100.0, 102.0, 98.0, 101.0, 99.0], 1500.0),
        );
        assert_eq!(
            kinds(&alerts),
            vec![AlertKind::LightSpike, AlertKind::LightAbnormal]
        );
    }

    #[test]
    fn test_uniform_history_never_alerts_statistically() {
        // ---
        let alerts = classifier().evaluate(SensorKind::Light, &window(&[100.0; 5], 900.0));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_insufficient_history_is_quiet() {
        // ---
        let c = classifier();
        let light = c.evaluate(SensorKind::Light, &window(&[100.0, 101.0, 99.0, 100.0], 5000.0));
        assert!(light.is_empty());

        let audio = c.evaluate(SensorKind::Audio, &window(&[100.0], 40000.0));
        assert!(audio.is_empty());

        assert!(c.evaluate(SensorKind::Light, &WindowSnapshot::default()).is_empty());
    }

    #[test]
    fn test_noise_spike_critical_and_outlier() {
        // ---
        let alerts = classifier().evaluate(
            SensorKind::Audio,
            &window(&[100.0, 110.0, 105.0, 95.0, 100.0], 35000.0),
        );
        assert_eq!(
            kinds(&alerts),
            vec![AlertKind::NoiseSpike, AlertKind::NoiseOutlier]
        );
        assert!(alerts.iter().all(|a| a.severity == Severity::Critical));
    }

    #[test]
    fn test_noise_spike_warning_band() {
        // ---
        // History mean 100, population std 10; candidate 128 gives z = 2.8
        let alerts = classifier().evaluate(
            SensorKind::Audio,
            &window(&[90.0, 110.0, 90.0, 110.0, 90.0, 110.0], 128.0),
        );
        assert_eq!(kinds(&alerts), vec![AlertKind::NoiseSpike]);
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_pass_order_and_cap() {
        // ---
        let c = Classifier::new(DetectionConfig {
            alert_cap: 3,
            ..DetectionConfig::default()
        });
        let light = window(&[100.0, 102.0, 98.0, 101.0, 99.0], 1500.0);
        let audio = window(&[100.0, 110.0, 105.0, 95.0, 100.0], 35000.0);

        // Four alerts raised, the oldest (first light alert) is dropped
        let alerts = c.evaluate_pass(&light, &audio);
        assert_eq!(
            kinds(&alerts),
            vec![
                AlertKind::LightAbnormal,
                AlertKind::NoiseSpike,
                AlertKind::NoiseOutlier
            ]
        );
    }

    #[test]
    fn test_same_reading_same_identity() {
        // ---
        let c = classifier();
        let w = window(&[100.0, 102.0, 98.0, 101.0, 99.0], 500.0);
        let first = c.evaluate(SensorKind::Light, &w);
        let second = c.evaluate(SensorKind::Light, &w);
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first, second);
    }
}
