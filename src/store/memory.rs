//! In-process reading store.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::models::{AudioReading, LightReading};

use super::{Order, ReadingQuery, ReadingStore, StorageResult};

// ---

#[derive(Debug, Default)]
pub struct MemoryReadingStore {
    light: RwLock<Vec<LightReading>>,
    audio: RwLock<Vec<AudioReading>>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Filter, order and truncate `rows` per `query`.
fn scan<T: Clone>(
    rows: &[T],
    query: &ReadingQuery,
    timestamp: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    // ---
    let mut hits: Vec<T> = rows
        .iter()
        .filter(|r| query.contains(timestamp(*r)))
        .cloned()
        .collect();

    hits.sort_by_key(|r| timestamp(r));
    if query.order == Order::NewestFirst {
        hits.reverse();
    }
    if let Some(limit) = query.limit {
        hits.truncate(limit as usize);
    }
    hits
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn insert_light(&self, reading: &LightReading) -> StorageResult<()> {
        // ---
        self.light
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .push(reading.clone());
        Ok(())
    }

    async fn insert_audio(&self, reading: &AudioReading) -> StorageResult<()> {
        // ---
        self.audio
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .push(reading.clone());
        Ok(())
    }

    async fn light_readings(&self, query: &ReadingQuery) -> StorageResult<Vec<LightReading>> {
        // ---
        let rows = self.light.read().map_err(|_| StorageError::Poisoned)?;
        Ok(scan(rows.as_slice(), query, |r| r.timestamp))
    }

    async fn audio_readings(&self, query: &ReadingQuery) -> StorageResult<Vec<AudioReading>> {
        // ---
        let rows = self.audio.read().map_err(|_| StorageError::Poisoned)?;
        Ok(scan(rows.as_slice(), query, |r| r.timestamp))
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn seeded() -> MemoryReadingStore {
        // ---
        let store = MemoryReadingStore::new();
        for i in 0..10 {
            let reading = LightReading {
                id: Uuid::new_v4(),
                timestamp: ts(i),
                lux: i as f64,
            };
            tokio_test::block_on(store.insert_light(&reading)).unwrap();
        }
        store
    }

    #[test]
    fn test_newest_first_with_limit() {
        // ---
        let store = seeded();
        let rows = tokio_test::block_on(store.light_readings(&ReadingQuery::latest(3))).unwrap();
        let lux: Vec<f64> = rows.iter().map(|r| r.lux).collect();
        assert_eq!(lux, vec![9.0, 8.0, 7.0]);
    }

    #[test]
    fn test_range_is_inclusive() {
        // ---
        let store = seeded();
        let query = ReadingQuery {
            start: Some(ts(2)),
            end: Some(ts(5)),
            order: Order::OldestFirst,
            ..ReadingQuery::default()
        };
        let rows = tokio_test::block_on(store.light_readings(&query)).unwrap();
        let lux: Vec<f64> = rows.iter().map(|r| r.lux).collect();
        assert_eq!(lux, vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_audio_roundtrip() {
        // ---
        let store = MemoryReadingStore::new();
        let reading = AudioReading {
            id: Uuid::new_v4(),
            timestamp: ts(0),
            samples: vec![1, -2, 3],
        };
        tokio_test::block_on(store.insert_audio(&reading)).unwrap();

        let rows = tokio_test::block_on(store.audio_readings(&ReadingQuery::default())).unwrap();
        assert_eq!(rows, vec![reading]);
    }
}
