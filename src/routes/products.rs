use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{ProductSummary, TrackProductRequest, TrackProductResponse, TrendReport};
use crate::services::tracker_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(track_product).get(list_products))
        .route("/trend", get(get_trend))
}

/// Add/Update Product: scrape the URL, append the observation, and notify if
/// the price is at or below the caller's threshold.
pub async fn track_product(
    State(state): State<AppState>,
    Json(req): Json<TrackProductRequest>,
) -> Result<Json<TrackProductResponse>, AppError> {
    info!("POST /products - Tracking {}", req.url);
    let response = tracker_service::track_product(&state, req).await.map_err(|e| {
        error!("Failed to track product: {}", e);
        e
    })?;
    Ok(Json(response))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductSummary>>, AppError> {
    info!("GET /products - Listing tracked products");
    Ok(Json(tracker_service::list_products(&state)))
}

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub url: String,
}

pub async fn get_trend(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendReport>, AppError> {
    info!("GET /products/trend - Trend for {}", params.url);
    let report = tracker_service::trend_report(&state, &params.url).map_err(|e| {
        error!("Failed to build trend report for {}: {}", params.url, e);
        e
    })?;
    Ok(Json(report))
}
