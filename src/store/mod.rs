//! Reading storage (EMBP gateway).
//!
//! Readings are append-only and keyed by arrival time. The engine only needs
//! inserts and ordered range scans, expressed by [`ReadingStore`].
//! [`PgReadingStore`] is the production backend; [`MemoryReadingStore`] keeps
//! everything in process for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::models::{AudioReading, LightReading};

mod memory;
mod postgres;

pub use memory::MemoryReadingStore;
pub use postgres::PgReadingStore;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Scan direction over arrival time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Range query over arrival time; both bounds inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub order: Order,
}

impl ReadingQuery {
    /// The newest `limit` readings, newest first.
    pub fn latest(limit: u32) -> Self {
        // ---
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        // ---
        self.start.map_or(true, |s| timestamp >= s) && self.end.map_or(true, |e| timestamp <= e)
    }
}

#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn insert_light(&self, reading: &LightReading) -> StorageResult<()>;

    async fn insert_audio(&self, reading: &AudioReading) -> StorageResult<()>;

    async fn light_readings(&self, query: &ReadingQuery) -> StorageResult<Vec<LightReading>>;

    async fn audio_readings(&self, query: &ReadingQuery) -> StorageResult<Vec<AudioReading>>;
}
