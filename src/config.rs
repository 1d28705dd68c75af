//! Configuration loader for the `coopwatch` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Service plumbing lives in [`Config`]; every
//! threshold, window size and cap used by the anomaly detectors lives in
//! [`DetectionConfig`], which is injected into the engine rather than read
//! from scattered literals.
//!
use std::env;

use anyhow::{anyhow, bail, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional `usize` environment variable with a default value.
macro_rules! parse_env_usize {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<usize>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional floating point environment variable with a default value.
macro_rules! parse_env_f64 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<f64>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Socket address the HTTP server binds to.
    pub bind_addr: String,

    /// Buffer size of the push channel feeding `/api/events` subscribers.
    pub event_channel_capacity: usize,

    /// Anomaly detection tuning.
    pub detection: DetectionConfig,
}

/// Thresholds and sizes for the rolling-window anomaly detectors.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    // ---
    /// Trailing light observations kept for scoring.
    pub light_window: usize,

    /// Trailing audio peak amplitudes kept for scoring.
    pub audio_window: usize,

    /// Minimum history length before any rule is evaluated.
    pub min_samples: usize,

    /// z-score above which a light reading counts as a spike.
    pub light_spike_z: f64,

    /// z-score above which a light reading counts as a drop.
    pub light_drop_z: f64,

    /// Absolute lux ceiling, independent of statistics.
    pub light_max_lux: f64,

    /// z-score above which an audio peak counts as a spike.
    pub noise_spike_z: f64,

    /// z-score above which a noise spike escalates to critical.
    pub noise_outlier_z: f64,

    /// Absolute peak amplitude ceiling, independent of statistics.
    pub noise_max_amplitude: f64,

    /// Maximum number of alerts retained by the registry.
    pub alert_cap: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        // ---
        Self {
            light_window: 20,
            audio_window: 50,
            min_samples: 5,
            light_spike_z: 2.5,
            light_drop_z: 2.5,
            light_max_lux: 1000.0,
            noise_spike_z: 2.5,
            noise_outlier_z: 3.0,
            noise_max_amplitude: 30000.0,
            alert_cap: 10,
        }
    }
}

impl DetectionConfig {
    /// Reject values that would leave the detectors without a usable window.
    pub fn validate(&self) -> Result<()> {
        // ---
        if self.light_window == 0 || self.audio_window == 0 {
            bail!("LIGHT_WINDOW and AUDIO_WINDOW must be greater than zero");
        }
        if self.alert_cap == 0 {
            bail!("ALERT_CAP must be greater than zero");
        }
        let thresholds = [
            ("LIGHT_SPIKE_Z", self.light_spike_z),
            ("LIGHT_DROP_Z", self.light_drop_z),
            ("LIGHT_MAX_LUX", self.light_max_lux),
            ("NOISE_SPIKE_Z", self.noise_spike_z),
            ("NOISE_OUTLIER_Z", self.noise_outlier_z),
            ("NOISE_MAX_AMPLITUDE", self.noise_max_amplitude),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be a finite, non-negative number (got {value})");
            }
        }
        Ok(())
    }
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `BIND_ADDR` – listen address (default: `0.0.0.0:8080`)
/// - `EVENT_CHANNEL_CAPACITY` – push channel buffer (default: 256)
/// - detector tuning, see [`load_detection_from_env`]
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let event_channel_capacity = parse_env_usize!("EVENT_CHANNEL_CAPACITY", 256);
    if event_channel_capacity == 0 {
        bail!("EVENT_CHANNEL_CAPACITY must be greater than zero");
    }
    let detection = load_detection_from_env()?;

    Ok(Config {
        db_url,
        db_pool_max,
        bind_addr,
        event_channel_capacity,
        detection,
    })
}

/// Load detector tuning, falling back to [`DetectionConfig::default`] per field.
///
/// Variables: `LIGHT_WINDOW`, `AUDIO_WINDOW`, `MIN_SAMPLES`, `LIGHT_SPIKE_Z`,
/// `LIGHT_DROP_Z`, `LIGHT_MAX_LUX`, `NOISE_SPIKE_Z`, `NOISE_OUTLIER_Z`,
/// `NOISE_MAX_AMPLITUDE`, `ALERT_CAP`.
pub fn load_detection_from_env() -> Result<DetectionConfig> {
    // ---
    let d = DetectionConfig::default();
    let detection = DetectionConfig {
        light_window: parse_env_usize!("LIGHT_WINDOW", d.light_window),
        audio_window: parse_env_usize!("AUDIO_WINDOW", d.audio_window),
        min_samples: parse_env_usize!("MIN_SAMPLES", d.min_samples),
        light_spike_z: parse_env_f64!("LIGHT_SPIKE_Z", d.light_spike_z),
        light_drop_z: parse_env_f64!("LIGHT_DROP_Z", d.light_drop_z),
        light_max_lux: parse_env_f64!("LIGHT_MAX_LUX", d.light_max_lux),
        noise_spike_z: parse_env_f64!("NOISE_SPIKE_Z", d.noise_spike_z),
        noise_outlier_z: parse_env_f64!("NOISE_OUTLIER_Z", d.noise_outlier_z),
        noise_max_amplitude: parse_env_f64!("NOISE_MAX_AMPLITUDE", d.noise_max_amplitude),
        alert_cap: parse_env_usize!("ALERT_CAP", d.alert_cap),
    };
    detection.validate()?;
    Ok(detection)
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        let d = &self.detection;

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL           : {}", mask_db_url(&self.db_url));
        tracing::info!("  DB_POOL_MAX            : {}", self.db_pool_max);
        tracing::info!("  BIND_ADDR              : {}", self.bind_addr);
        tracing::info!("  EVENT_CHANNEL_CAPACITY : {}", self.event_channel_capacity);
        tracing::info!("  LIGHT_WINDOW           : {}", d.light_window);
        tracing::info!("  AUDIO_WINDOW           : {}", d.audio_window);
        tracing::info!("  MIN_SAMPLES            : {}", d.min_samples);
        tracing::info!("  LIGHT_SPIKE_Z          : {}", d.light_spike_z);
        tracing::info!("  LIGHT_DROP_Z           : {}", d.light_drop_z);
        tracing::info!("  LIGHT_MAX_LUX          : {}", d.light_max_lux);
        tracing::info!("  NOISE_SPIKE_Z          : {}", d.noise_spike_z);
        tracing::info!("  NOISE_OUTLIER_Z        : {}", d.noise_outlier_z);
        tracing::info!("  NOISE_MAX_AMPLITUDE    : {}", d.noise_max_amplitude);
        tracing::info!("  ALERT_CAP              : {}", d.alert_cap);
    }
}

/// Replace the password portion of a connection URL with `****`.
///
/// The user name ends at the first `:` of the user info, so a password
/// containing `:` is masked whole.
pub fn mask_db_url(db_url: &str) -> String {
    // ---
    let start = db_url.find("://").map_or(0, |pos| pos + 3);
    let Some(at_pos) = db_url.rfind('@').filter(|&pos| pos >= start) else {
        return db_url.to_string();
    };
    match db_url[start..at_pos].find(':') {
        Some(colon) => format!("{}:****{}", &db_url[..start + colon], &db_url[at_pos..]),
        None => db_url.to_string(),
    }
}
