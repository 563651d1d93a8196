use sqlx::SqlitePool;
use tracing::error;

use crate::models::{PricePoint, ProductRecord};

/// One row per tracked product; history is stored as a JSON list of
/// (timestamp, price) points and must round-trip exactly.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    url: String,
    name: String,
    history: String,
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracked_products (
            url TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            history TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Load every tracked product at startup.
///
/// History is parsed with a strict JSON parser; a row that does not parse is
/// rejected and skipped (logged), never evaluated, and never takes down the rest.
pub async fn load_all(pool: &SqlitePool) -> Result<Vec<ProductRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProductRow>("SELECT url, name, history FROM tracked_products")
        .fetch_all(pool)
        .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_str::<Vec<PricePoint>>(&row.history) {
            Ok(history) => records.push(ProductRecord {
                url: row.url,
                name: row.name,
                history,
            }),
            Err(e) => {
                error!("Rejecting corrupt history for {}: {}", row.url, e);
            }
        }
    }

    Ok(records)
}

/// Write-through upsert of the full record. Callers must not treat an append
/// as committed until this returns Ok.
pub async fn upsert(pool: &SqlitePool, record: &ProductRecord) -> Result<(), sqlx::Error> {
    let history = serde_json::to_string(&record.history)
        .map_err(|e| sqlx::Error::Protocol(format!("failed to serialize history: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO tracked_products (url, name, history)
        VALUES (?, ?, ?)
        ON CONFLICT (url)
        DO UPDATE SET name = excluded.name, history = excluded.history
        "#,
    )
    .bind(&record.url)
    .bind(&record.name)
    .bind(&history)
    .execute(pool)
    .await?;

    Ok(())
}
