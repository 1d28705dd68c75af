//! Database schema management for `coopwatch`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates one append-only table per sensor, each indexed on arrival time so
/// range scans and "latest N" queries stay cheap. Safe to call on every
/// startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    // BH1750 ambient light readings
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bh1750_readings (
            id          UUID             PRIMARY KEY,
            timestamp   TIMESTAMPTZ      NOT NULL DEFAULT now(),
            lux         DOUBLE PRECISION NOT NULL CHECK (lux >= 0)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // INMP441 audio bursts
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inmp441_readings (
            id          UUID        PRIMARY KEY,
            timestamp   TIMESTAMPTZ NOT NULL DEFAULT now(),
            samples     INTEGER[]   NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_bh1750_readings_timestamp
            ON bh1750_readings (timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_inmp441_readings_timestamp
            ON inmp441_readings (timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
