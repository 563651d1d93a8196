use serde::Serialize;

use crate::models::PricePoint;

/// Everything the Visualize Price Trend view needs for one product:
/// the raw series to chart, a one-step-ahead forecast, and the indices
/// of observations flagged as anomalous.
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub url: String,
    pub name: String,
    pub history: Vec<PricePoint>,
    /// Absent when fewer than two observations exist.
    pub predicted_price: Option<f64>,
    /// Indices into `history`, ascending. Empty when nothing stands out.
    pub anomalies: Vec<usize>,
}
