use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// A single timestamped price observation. Immutable once appended;
// history order is insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn now(price: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            price,
        }
    }
}

/// A tracked product keyed by its source URL, with its full price history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub url: String,
    pub name: String,
    pub history: Vec<PricePoint>,
}

impl ProductRecord {
    pub fn latest_price(&self) -> Option<f64> {
        self.history.last().map(|p| p.price)
    }
}

/// Condensed row for the "List Tracked Products" view.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub url: String,
    pub name: String,
    pub latest_price: f64,
    pub observations: usize,
}

impl From<&ProductRecord> for ProductSummary {
    fn from(record: &ProductRecord) -> Self {
        Self {
            url: record.url.clone(),
            name: record.name.clone(),
            latest_price: record.latest_price().unwrap_or(0.0),
            observations: record.history.len(),
        }
    }
}
