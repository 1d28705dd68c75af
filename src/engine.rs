//! The alert engine: owns the sensor windows and the alert registry.
//!
//! Every accepted reading goes through [`AlertEngine::ingest`], which appends
//! it to its sensor's window and then runs one evaluation pass over both
//! sensors. The pass result replaces the registry's working set and, when it
//! changed, is pushed to subscribers as [`StreamEvent::AlertsChanged`].
//!
//! Locking:
//! - the registry mutex doubles as the pass lock; ingestion takes it before
//!   appending, so each pass scores the reading that triggered it and
//!   notifications go out in pass order
//! - locks are always taken in registry -> light -> audio order
//! - nothing here awaits; broadcasting never blocks on slow subscribers
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::anomaly::{Alert, AlertRegistry, Classifier, Observation, SensorWindow, WindowSnapshot};
use crate::config::DetectionConfig;
use crate::error::EngineError;
use crate::models::{AudioReading, LightReading, Reading, SensorKind};

// ---

/// Messages broadcast to push-transport observers.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    LightReading(LightReading),
    AudioReading(AudioReading),
    AlertsChanged(Vec<Alert>),
}

impl StreamEvent {
    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        // ---
        match self {
            StreamEvent::LightReading(_) => "bh1750:new",
            StreamEvent::AudioReading(_) => "inmp441:new",
            StreamEvent::AlertsChanged(_) => "alerts:changed",
        }
    }

    /// JSON payload on the wire.
    pub fn to_json(&self) -> serde_json::Result<String> {
        // ---
        match self {
            StreamEvent::LightReading(r) => serde_json::to_string(r),
            StreamEvent::AudioReading(r) => serde_json::to_string(r),
            StreamEvent::AlertsChanged(alerts) => serde_json::to_string(alerts),
        }
    }
}

/// Point-in-time counters, served by `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub light_window: usize,
    pub audio_window: usize,
    pub active_alerts: usize,
    pub subscribers: usize,
}

pub struct AlertEngine {
    classifier: Classifier,
    light: Mutex<SensorWindow>,
    audio: Mutex<SensorWindow>,
    registry: Mutex<AlertRegistry>,
    events: broadcast::Sender<StreamEvent>,
}

impl AlertEngine {
    /// `config` must already be validated; zero window sizes panic.
    pub fn new(config: DetectionConfig, channel_capacity: usize) -> Self {
        // ---
        let (events, _) = broadcast::channel(channel_capacity);
        Self {
            light: Mutex::new(SensorWindow::new(config.light_window)),
            audio: Mutex::new(SensorWindow::new(config.audio_window)),
            registry: Mutex::new(AlertRegistry::new(config.alert_cap)),
            classifier: Classifier::new(config),
            events,
        }
    }

    /// Append a reading and run an evaluation pass.
    ///
    /// Returns the full alert set after the pass, which always scores
    /// `reading` as its sensor's latest observation.
    pub fn ingest(&self, reading: &Reading) -> Result<Vec<Alert>, EngineError> {
        // ---
        let mut registry = lock(&self.registry, "alert registry")?;
        self.admit(reading)?;
        self.pass(&mut registry)
    }

    /// Stamp, append and score a reading built by `build`.
    ///
    /// `build` receives the arrival time, taken under the pass lock and never
    /// earlier than the newest observation already held, so window order and
    /// timestamp order agree under concurrent ingestion.
    pub fn ingest_with<T, F>(&self, build: F) -> Result<(T, Vec<Alert>), EngineError>
    where
        T: Clone + Into<Reading>,
        F: FnOnce(DateTime<Utc>) -> T,
    {
        // ---
        let mut registry = lock(&self.registry, "alert registry")?;
        let light = self.window(SensorKind::Light)?.latest_timestamp();
        let audio = self.window(SensorKind::Audio)?.latest_timestamp();
        let now = match light.max(audio) {
            Some(newest) => Utc::now().max(newest),
            None => Utc::now(),
        };

        let built = build(now);
        self.admit(&built.clone().into())?;
        let alerts = self.pass(&mut registry)?;
        Ok((built, alerts))
    }

    /// Append a reading without evaluating, for re-seeding after a restart.
    pub fn seed(&self, reading: &Reading) -> Result<(), EngineError> {
        // ---
        let _registry = lock(&self.registry, "alert registry")?;
        self.append(reading)
    }

    /// Score the latest observation of each sensor and replace the registry.
    pub fn run_pass(&self) -> Result<Vec<Alert>, EngineError> {
        // ---
        let mut registry = lock(&self.registry, "alert registry")?;
        self.pass(&mut registry)
    }

    /// Current alerts raised by one sensor.
    pub fn evaluate(&self, sensor: SensorKind) -> Result<Vec<Alert>, EngineError> {
        // ---
        Ok(lock(&self.registry, "alert registry")?.for_sensor(sensor))
    }

    /// Current alerts across both sensors, light first.
    pub fn alerts(&self) -> Result<Vec<Alert>, EngineError> {
        // ---
        Ok(lock(&self.registry, "alert registry")?.alerts().to_vec())
    }

    /// Drop every retained alert; the next pass rebuilds from scratch.
    pub fn clear(&self) -> Result<(), EngineError> {
        // ---
        let mut registry = lock(&self.registry, "alert registry")?;
        if registry.clear() {
            self.publish(StreamEvent::AlertsChanged(Vec::new()));
        }
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.events.subscribe()
    }

    /// Fire-and-forget broadcast; having no subscribers is not an error.
    pub fn publish(&self, event: StreamEvent) {
        // ---
        if self.events.send(event).is_err() {
            debug!("No event subscribers connected");
        }
    }

    pub fn status(&self) -> Result<EngineStatus, EngineError> {
        // ---
        // One guard at a time, in registry -> light -> audio order
        let active_alerts = lock(&self.registry, "alert registry")?.len();
        let light_window = lock(&self.light, "light window")?.len();
        let audio_window = lock(&self.audio, "audio window")?.len();

        Ok(EngineStatus {
            light_window,
            audio_window,
            active_alerts,
            subscribers: self.events.receiver_count(),
        })
    }

    pub fn config(&self) -> &DetectionConfig {
        self.classifier.config()
    }

    /// One evaluation pass; the caller holds the registry (pass) lock.
    fn pass(&self, registry: &mut AlertRegistry) -> Result<Vec<Alert>, EngineError> {
        // ---
        let light = self.snapshot(SensorKind::Light)?;
        let audio = self.snapshot(SensorKind::Audio)?;

        let alerts = self.classifier.evaluate_pass(&light, &audio);
        for alert in alerts
            .iter()
            .filter(|a| !registry.alerts().iter().any(|prev| prev.id == a.id))
        {
            warn!(
                "Alert raised: {} [{:?}] {} (value: {:?})",
                alert.id, alert.severity, alert.title, alert.value
            );
        }

        let changed = registry.replace(alerts);
        let current = registry.alerts().to_vec();
        debug!(
            "Evaluation pass: light history {}, audio history {}, {} alert(s), changed={}",
            light.history.len(),
            audio.history.len(),
            current.len(),
            changed
        );

        if changed {
            self.publish(StreamEvent::AlertsChanged(current.clone()));
        }
        Ok(current)
    }

    fn admit(&self, reading: &Reading) -> Result<(), EngineError> {
        // ---
        self.append(reading).inspect_err(|e| {
            error!("Rejected {} reading at {}: {}", reading.kind(), reading.timestamp(), e)
        })
    }

    fn append(&self, reading: &Reading) -> Result<(), EngineError> {
        // ---
        let kind = reading.kind();
        let value = reading
            .observation()
            .ok_or(EngineError::EmptyPayload(kind))?;
        let observation = Observation {
            timestamp: reading.timestamp(),
            value,
        };

        self.window(kind)?.append(observation);
        Ok(())
    }

    fn snapshot(&self, kind: SensorKind) -> Result<WindowSnapshot, EngineError> {
        Ok(self.window(kind)?.snapshot())
    }

    fn window(&self, kind: SensorKind) -> Result<MutexGuard<'_, SensorWindow>, EngineError> {
        // ---
        match kind {
            SensorKind::Light => lock(&self.light, "light window"),
            SensorKind::Audio => lock(&self.audio, "audio window"),
        }
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &'static str) -> Result<MutexGuard<'a, T>, EngineError> {
    mutex.lock().map_err(|_| EngineError::Poisoned(name))
}
