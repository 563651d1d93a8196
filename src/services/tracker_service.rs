use tracing::{error, info, warn};
use url::Url;

use crate::errors::AppError;
use crate::external::scraper::ScrapeError;
use crate::models::{
    NotificationOutcome, PricePoint, ProductSummary, TrackProductRequest, TrackProductResponse,
    TrendReport,
};
use crate::services::{anomaly_service, forecasting_service, notification_service};
use crate::state::AppState;

/// One full tracking round for a product: scrape, ingest, persist, and
/// conditionally notify. The append commits before the notification is
/// attempted, so a failed send never loses the observation.
pub async fn track_product(
    state: &AppState,
    req: TrackProductRequest,
) -> Result<TrackProductResponse, AppError> {
    Url::parse(&req.url)
        .map_err(|e| AppError::Validation(format!("Invalid product URL: {e}")))?;

    let scraped = state.scraper.fetch(&req.url).await.map_err(|e| {
        match e {
            ScrapeError::Network(msg) => warn!("Scrape failed for {}: {}", req.url, msg),
            ScrapeError::Extraction => warn!("Extraction failed for {}", req.url),
        }
        AppError::ExtractionFailed
    })?;

    let point = PricePoint::now(scraped.price);
    let timestamp = point.timestamp;
    let outcome = state.store.append(&req.url, &scraped.name, point).await?;

    if outcome.created {
        info!("Tracking new product: {} at {}", scraped.name, scraped.price);
    } else if let Some(old_price) = outcome.previous_price {
        if old_price != scraped.price {
            info!(
                "Price updated for {}: {} -> {}",
                scraped.name, old_price, scraped.price
            );
        }
    }

    let notification = if notification_service::threshold_met(scraped.price, req.threshold) {
        match notification_service::notify_price_drop(
            state.notifier.as_ref(),
            &req.email,
            &scraped.name,
            scraped.price,
            req.threshold,
        )
        .await
        {
            Ok(()) => NotificationOutcome::Sent {
                recipient: req.email.clone(),
            },
            Err(e) => {
                error!("Notification failed for {}: {}", req.url, e);
                NotificationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    } else {
        NotificationOutcome::NotTriggered
    };

    Ok(TrackProductResponse {
        url: req.url,
        name: scraped.name,
        price: scraped.price,
        timestamp,
        created: outcome.created,
        previous_price: outcome.previous_price,
        notification,
    })
}

pub fn list_products(state: &AppState) -> Vec<ProductSummary> {
    state
        .store
        .list()
        .iter()
        .map(ProductSummary::from)
        .collect()
}

/// History plus derived analysis for the trend view.
pub fn trend_report(state: &AppState, url: &str) -> Result<TrendReport, AppError> {
    let record = state.store.get(url).ok_or(AppError::NotFound)?;

    let prices: Vec<f64> = record.history.iter().map(|p| p.price).collect();
    let predicted_price = forecasting_service::forecast_next_price(&prices);
    let anomalies =
        anomaly_service::detect_price_anomalies(&prices, anomaly_service::DEFAULT_ANOMALY_FRACTION);

    Ok(TrendReport {
        url: record.url,
        name: record.name,
        history: record.history,
        predicted_price,
        anomalies,
    })
}
