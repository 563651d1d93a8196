use std::sync::Arc;

use dashmap::DashMap;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::db::product_queries;
use crate::errors::AppError;
use crate::models::{PricePoint, ProductRecord};

/// Result of appending one observation.
#[derive(Debug, Clone, Copy)]
pub struct AppendOutcome {
    /// true when the append created the record (first ingestion for this URL).
    pub created: bool,
    pub previous_price: Option<f64>,
}

/// In-memory cache of tracked products with write-through persistence.
///
/// The cache is hydrated from sqlite at startup and is the single owner of
/// ProductRecord state afterwards; records are mutated only via `append`.
/// Appends are read-modify-write and are serialized per URL, so two racing
/// updates on the same product cannot lose an observation.
#[derive(Clone)]
pub struct ProductStore {
    pool: SqlitePool,
    cache: Arc<DashMap<String, ProductRecord>>,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            cache: Arc::new(DashMap::new()),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Hydrate the cache from durable storage. Returns the number of products loaded.
    pub async fn load_from_db(&self) -> Result<usize, AppError> {
        let records = product_queries::load_all(&self.pool).await?;
        let count = records.len();
        for record in records {
            self.cache.insert(record.url.clone(), record);
        }
        info!("Loaded {} tracked product(s) from storage", count);
        Ok(count)
    }

    pub fn get(&self, url: &str) -> Option<ProductRecord> {
        self.cache.get(url).map(|r| r.clone())
    }

    pub fn list(&self) -> Vec<ProductRecord> {
        let mut records: Vec<ProductRecord> =
            self.cache.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| a.url.cmp(&b.url));
        records
    }

    /// Append one observation, creating the record on first ingestion.
    ///
    /// Persist-then-acknowledge: the durable upsert must succeed before the
    /// cache is updated, so a failed write leaves both sides at the previous
    /// committed state and surfaces as an error.
    pub async fn append(
        &self,
        url: &str,
        name: &str,
        point: PricePoint,
    ) -> Result<AppendOutcome, AppError> {
        let lock = self
            .locks
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let mut record = match self.cache.get(url).map(|r| r.clone()) {
            Some(existing) => existing,
            None => ProductRecord {
                url: url.to_string(),
                name: name.to_string(),
                history: Vec::new(),
            },
        };

        let created = record.history.is_empty();
        let previous_price = record.latest_price();

        if let Some(last) = record.history.last() {
            // Timestamps come from the wall clock, so monotonicity is expected
            // but not guaranteed. Accept and note.
            if point.timestamp < last.timestamp {
                warn!(
                    "Out-of-order observation for {}: {} < {}",
                    url, point.timestamp, last.timestamp
                );
            }
        }

        record.name = name.to_string();
        record.history.push(point);

        product_queries::upsert(&self.pool, &record).await?;
        self.cache.insert(url.to_string(), record);

        Ok(AppendOutcome {
            created,
            previous_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_store() -> ProductStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        product_queries::init_schema(&pool).await.unwrap();
        ProductStore::new(pool)
    }

    #[tokio::test]
    async fn first_append_creates_record() {
        let store = test_store().await;
        let outcome = store
            .append("https://shop.test/widget", "Widget", PricePoint::now(99.0))
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.previous_price, None);

        let record = store.get("https://shop.test/widget").unwrap();
        assert_eq!(record.name, "Widget");
        assert_eq!(record.history.len(), 1);
        assert_eq!(record.latest_price(), Some(99.0));
    }

    #[tokio::test]
    async fn subsequent_append_extends_history() {
        let store = test_store().await;
        let url = "https://shop.test/widget";
        store.append(url, "Widget", PricePoint::now(99.0)).await.unwrap();
        let outcome = store.append(url, "Widget", PricePoint::now(89.0)).await.unwrap();

        assert!(!outcome.created);
        assert_eq!(outcome.previous_price, Some(99.0));

        let record = store.get(url).unwrap();
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.latest_price(), Some(89.0));
    }

    #[tokio::test]
    async fn out_of_order_timestamp_is_accepted() {
        let store = test_store().await;
        let url = "https://shop.test/widget";
        let now = Utc::now();

        store
            .append(
                url,
                "Widget",
                PricePoint {
                    timestamp: now,
                    price: 50.0,
                },
            )
            .await
            .unwrap();
        store
            .append(
                url,
                "Widget",
                PricePoint {
                    timestamp: now - Duration::seconds(30),
                    price: 48.0,
                },
            )
            .await
            .unwrap();

        // Insertion order is preserved even when the clock went backwards.
        let record = store.get(url).unwrap();
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.history[1].price, 48.0);
    }

    #[tokio::test]
    async fn history_round_trips_through_storage() {
        let store = test_store().await;
        let url = "https://shop.test/widget";
        for price in [100.0, 95.5, 97.25, 91.0] {
            store.append(url, "Widget", PricePoint::now(price)).await.unwrap();
        }
        let before = store.get(url).unwrap();

        // A fresh store over the same pool simulates a restart.
        let reloaded = ProductStore::new(store.pool.clone());
        reloaded.load_from_db().await.unwrap();
        let after = reloaded.get(url).unwrap();

        assert_eq!(after.name, before.name);
        assert_eq!(after.history, before.history);
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let store = test_store().await;
        let url = "https://shop.test/widget";
        store.append(url, "Widget", PricePoint::now(100.0)).await.unwrap();

        let a = store.clone();
        let b = store.clone();
        let (ra, rb) = tokio::join!(
            a.append(url, "Widget", PricePoint::now(90.0)),
            b.append(url, "Widget", PricePoint::now(80.0)),
        );
        ra.unwrap();
        rb.unwrap();

        assert_eq!(store.get(url).unwrap().history.len(), 3);

        // Durable state agrees with the cache.
        let reloaded = ProductStore::new(store.pool.clone());
        reloaded.load_from_db().await.unwrap();
        assert_eq!(reloaded.get(url).unwrap().history.len(), 3);
    }

    #[tokio::test]
    async fn corrupt_history_row_is_skipped_on_load() {
        let store = test_store().await;
        store
            .append("https://shop.test/ok", "Fine", PricePoint::now(10.0))
            .await
            .unwrap();

        sqlx::query("INSERT INTO tracked_products (url, name, history) VALUES (?, ?, ?)")
            .bind("https://shop.test/bad")
            .bind("Broken")
            .bind("__import__('os')")
            .execute(&store.pool)
            .await
            .unwrap();

        let reloaded = ProductStore::new(store.pool.clone());
        let count = reloaded.load_from_db().await.unwrap();
        assert_eq!(count, 1);
        assert!(reloaded.get("https://shop.test/ok").is_some());
        assert!(reloaded.get("https://shop.test/bad").is_none());
    }
}
