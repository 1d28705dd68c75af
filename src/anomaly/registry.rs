//! Bounded set of alerts from the latest evaluation pass.

use crate::models::SensorKind;

use super::alert::Alert;

// ---

/// Holds the alerts of the most recent pass, never more than `cap`.
///
/// Each pass *replaces* the working set; alerts from an earlier pass that the
/// latest pass did not raise again are dropped, even if the condition behind
/// them persists.
#[derive(Debug)]
pub struct AlertRegistry {
    cap: usize,
    alerts: Vec<Alert>,
}

impl AlertRegistry {
    pub fn new(cap: usize) -> Self {
        // ---
        Self {
            cap,
            alerts: Vec::new(),
        }
    }

    /// Install the result of a pass, keeping its last `cap` alerts.
    ///
    /// Returns `true` when the retained set differs from the previous one.
    pub fn replace(&mut self, mut alerts: Vec<Alert>) -> bool {
        // ---
        let excess = alerts.len().saturating_sub(self.cap);
        alerts.drain(..excess);

        if alerts == self.alerts {
            return false;
        }
        self.alerts = alerts;
        true
    }

    /// Empty the registry. Returns `true` if anything was removed.
    pub fn clear(&mut self) -> bool {
        // ---
        let had_alerts = !self.alerts.is_empty();
        self.alerts.clear();
        had_alerts
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn for_sensor(&self, sensor: SensorKind) -> Vec<Alert> {
        // ---
        self.alerts
            .iter()
            .filter(|a| a.kind.sensor() == sensor)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::anomaly::alert::{AlertKind, Severity};
    use chrono::{TimeZone, Utc};

    fn alert(kind: AlertKind, secs: i64) -> Alert {
        // ---
        Alert::new(
            kind,
            Severity::Warning,
            Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
            "title",
            "message",
            None,
        )
    }

    #[test]
    fn test_never_exceeds_cap() {
        // ---
        let mut registry = AlertRegistry::new(10);
        for pass in 0..5 {
            let batch: Vec<Alert> = (0..(pass * 4))
                .map(|i| alert(AlertKind::NoiseSpike, i))
                .collect();
            registry.replace(batch);
            assert!(registry.len() <= 10);
        }

        let batch: Vec<Alert> = (0..25).map(|i| alert(AlertKind::LightSpike, i)).collect();
        registry.replace(batch);
        assert_eq!(registry.len(), 10);
        // The most recent ones survive
        assert_eq!(registry.alerts()[9].id, alert(AlertKind::LightSpike, 24).id);
    }

    #[test]
    fn test_replace_not_merge() {
        // ---
        let mut registry = AlertRegistry::new(10);
        assert!(registry.replace(vec![alert(AlertKind::LightSpike, 1)]));
        assert!(registry.replace(vec![alert(AlertKind::NoiseOutlier, 2)]));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.alerts()[0].kind, AlertKind::NoiseOutlier);
    }

    #[test]
    fn test_replace_reports_change() {
        // ---
        let mut registry = AlertRegistry::new(10);
        assert!(!registry.replace(Vec::new()));
        assert!(registry.replace(vec![alert(AlertKind::LightDrop, 1)]));
        assert!(!registry.replace(vec![alert(AlertKind::LightDrop, 1)]));
    }

    #[test]
    fn test_clear() {
        // ---
        let mut registry = AlertRegistry::new(10);
        assert!(!registry.clear());

        registry.replace((0..8).map(|i| alert(AlertKind::NoiseSpike, i)).collect());
        assert!(registry.clear());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_for_sensor() {
        // ---
        let mut registry = AlertRegistry::new(10);
        registry.replace(vec![
            alert(AlertKind::LightAbnormal, 1),
            alert(AlertKind::NoiseSpike, 2),
            alert(AlertKind::NoiseOutlier, 2),
        ]);

        assert_eq!(registry.for_sensor(SensorKind::Light).len(), 1);
        assert_eq!(registry.for_sensor(SensorKind::Audio).len(), 2);
    }
}
