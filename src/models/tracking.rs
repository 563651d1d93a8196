use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload for the Add/Update Product view.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackProductRequest {
    pub url: String,
    /// Recipient for the threshold notification.
    pub email: String,
    /// Price ceiling; a notification fires whenever the latest price is at or below it.
    pub threshold: f64,
}

/// Outcome of one tracking round: scrape, append, optional notification.
#[derive(Debug, Clone, Serialize)]
pub struct TrackProductResponse {
    pub url: String,
    pub name: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    /// true when this ingestion created the record, false when it appended.
    pub created: bool,
    /// Last price before this observation, when the product was already tracked.
    pub previous_price: Option<f64>,
    pub notification: NotificationOutcome,
}

/// Notification delivery is reported, never silently swallowed, and a failed
/// send does not undo the already-committed append.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    NotTriggered,
    Sent { recipient: String },
    Failed { reason: String },
}
