//! `coopwatch`: light and sound anomaly alerting for a sensor-equipped coop.
//!
//! An ESP32 posts BH1750 light readings and INMP441 audio bursts. Each
//! reading is validated, stored, and scored against a trailing window of the
//! same sensor's history; anything unusual becomes a typed, severity-ranked
//! alert that observers can pull (`/api/alerts`) or receive as it happens
//! (`/api/events`).
//!
//! Module map (Explicit Module Boundary Pattern, EMBP):
//! - `anomaly`: windows, statistics, rules and the alert registry
//! - `engine`: owns the windows and registry, runs evaluation passes
//! - `store`: append-only reading storage (PostgreSQL or in-memory)
//! - `routes`: the HTTP gateway
//! - `config`, `schema`, `reseed`: startup plumbing

pub mod anomaly;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod reseed;
pub mod routes;
pub mod schema;
pub mod store;

pub use config::{Config, DetectionConfig};
pub use engine::{AlertEngine, StreamEvent};
pub use routes::{router, AppState};
