//! Streaming anomaly detection (EMBP gateway).
//!
//! - `window`: trailing observations per sensor
//! - `stats`: mean, population std and z-score
//! - `alert`: typed, severity-ranked alert records
//! - `classify`: the per-sensor rules
//! - `registry`: bounded alert set of the latest pass
//!
//! Siblings are private; everything callers need is re-exported here.

mod alert;
mod classify;
mod registry;
mod stats;
mod window;

pub use alert::{alert_id, Alert, AlertKind, Severity};
pub use classify::Classifier;
pub use registry::AlertRegistry;
pub use stats::{stats, z_score, Stats};
pub use window::{Observation, SensorWindow, WindowSnapshot};
