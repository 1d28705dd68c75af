//! PostgreSQL-backed reading store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{AudioReading, LightReading};

use super::{Order, ReadingQuery, ReadingStore, StorageResult};

// ---

#[derive(Debug, Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build `SELECT <columns> FROM <table> WHERE ... ORDER BY ... LIMIT ...`.
fn select<'a>(columns: &str, table: &str, query: &'a ReadingQuery) -> QueryBuilder<'a, Postgres> {
    // ---
    let mut qb = QueryBuilder::new(format!("SELECT {columns} FROM {table} WHERE TRUE"));

    if let Some(start) = query.start {
        qb.push(" AND timestamp >= ").push_bind(start);
    }
    if let Some(end) = query.end {
        qb.push(" AND timestamp <= ").push_bind(end);
    }

    qb.push(match query.order {
        Order::NewestFirst => " ORDER BY timestamp DESC",
        Order::OldestFirst => " ORDER BY timestamp ASC",
    });

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ").push_bind(i64::from(limit));
    }
    qb
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn insert_light(&self, reading: &LightReading) -> StorageResult<()> {
        // ---
        sqlx::query(
            r#"
            INSERT INTO bh1750_readings (id, timestamp, lux)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(reading.id)
        .bind(reading.timestamp)
        .bind(reading.lux)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_audio(&self, reading: &AudioReading) -> StorageResult<()> {
        // ---
        sqlx::query(
            r#"
            INSERT INTO inmp441_readings (id, timestamp, samples)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(reading.id)
        .bind(reading.timestamp)
        .bind(&reading.samples)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn light_readings(&self, query: &ReadingQuery) -> StorageResult<Vec<LightReading>> {
        // ---
        let mut qb = select("id, timestamp, lux", "bh1750_readings", query);
        let rows = qb
            .build_query_as::<LightReading>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn audio_readings(&self, query: &ReadingQuery) -> StorageResult<Vec<AudioReading>> {
        // ---
        let mut qb = select("id, timestamp, samples", "inmp441_readings", query);
        let rows = qb
            .build_query_as::<AudioReading>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
