//! Data models for the coop sensor streams.
//!
//! Two sensors report in: a BH1750 ambient-light sensor (one lux value per
//! reading) and an INMP441 microphone (a burst of signed amplitude samples
//! per reading). Incoming request bodies are validated here, before anything
//! reaches storage or the anomaly engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FieldError;

// ---

/// Longest sample burst accepted from the microphone.
pub const MAX_AUDIO_SAMPLES: usize = 10_000;

/// Which stream a reading, window or alert belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Light,
    Audio,
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            SensorKind::Light => "light",
            SensorKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for `POST /api/sensors/bh1750`.
#[derive(Debug, Deserialize)]
pub struct LightReadingInput {
    pub lux: f64,
}

/// Request body for `POST /api/sensors/inmp441`.
#[derive(Debug, Deserialize)]
pub struct AudioReadingInput {
    pub samples: Vec<i32>,
}

/// Stored ambient-light reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LightReading {
    // ---
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub lux: f64,
}

/// Stored audio reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AudioReading {
    // ---
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub samples: Vec<i32>,
}

/// A reading of either kind, as handed to the anomaly engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Light(LightReading),
    Audio(AudioReading),
}

impl LightReadingInput {
    /// Reject lux values no sensor can produce.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        // ---
        if !self.lux.is_finite() {
            return Err(vec![FieldError::new("body.lux", "lux must be a finite number")]);
        }
        if self.lux < 0.0 {
            return Err(vec![FieldError::new(
                "body.lux",
                "lux must be a non-negative number",
            )]);
        }
        Ok(())
    }

    /// Give a validated payload a fresh id and its arrival time.
    pub fn stamp(self, now: DateTime<Utc>) -> LightReading {
        LightReading {
            id: Uuid::new_v4(),
            timestamp: now,
            lux: self.lux,
        }
    }
}

impl AudioReadingInput {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        // ---
        if self.samples.is_empty() {
            return Err(vec![FieldError::new(
                "body.samples",
                "samples array must contain at least one element",
            )]);
        }
        if self.samples.len() > MAX_AUDIO_SAMPLES {
            return Err(vec![FieldError::new(
                "body.samples",
                format!("samples array cannot exceed {MAX_AUDIO_SAMPLES} elements"),
            )]);
        }
        Ok(())
    }

    pub fn stamp(self, now: DateTime<Utc>) -> AudioReading {
        AudioReading {
            id: Uuid::new_v4(),
            timestamp: now,
            samples: self.samples,
        }
    }
}

impl AudioReading {
    /// Largest absolute sample value, or `None` for an empty burst.
    ///
    /// Computed in `i64` so `i32::MIN` does not overflow.
    pub fn peak_amplitude(&self) -> Option<f64> {
        // ---
        self.samples
            .iter()
            .map(|&s| (s as i64).abs())
            .max()
            .map(|peak| peak as f64)
    }
}

impl Reading {
    pub fn kind(&self) -> SensorKind {
        // ---
        match self {
            Reading::Light(_) => SensorKind::Light,
            Reading::Audio(_) => SensorKind::Audio,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        // ---
        match self {
            Reading::Light(r) => r.timestamp,
            Reading::Audio(r) => r.timestamp,
        }
    }

    /// The scalar the detectors score: lux, or peak absolute amplitude.
    pub fn observation(&self) -> Option<f64> {
        // ---
        match self {
            Reading::Light(r) => Some(r.lux),
            Reading::Audio(r) => r.peak_amplitude(),
        }
    }
}

impl From<LightReading> for Reading {
    fn from(r: LightReading) -> Self {
        Reading::Light(r)
    }
}

impl From<AudioReading> for Reading {
    fn from(r: AudioReading) -> Self {
        Reading::Audio(r)
    }
}
