/// One-step-ahead linear trend forecast over a price series.
///
/// Fits y = m*x + b by ordinary least squares with the sequence position
/// 0..n-1 as x, and evaluates the line at position n. Fewer than two
/// observations is a defined absence, not an error.
pub fn forecast_next_price(prices: &[f64]) -> Option<f64> {
    let n = prices.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = prices.iter().sum::<f64>() / n_f;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in prices.iter().enumerate() {
        let x = i as f64;
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean) * (x - x_mean);
    }

    // denominator > 0 for any n >= 2, so a zero-variance series simply
    // produces slope 0 and a flat forecast.
    let slope = numerator / denominator;
    let intercept = y_mean - slope * x_mean;

    let predicted = slope * n_f + intercept;
    Some(predicted.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_short_series_has_no_forecast() {
        assert_eq!(forecast_next_price(&[]), None);
        assert_eq!(forecast_next_price(&[42.0]), None);
    }

    #[test]
    fn flat_series_forecasts_the_constant() {
        let prices = [100.0, 100.0, 100.0, 100.0];
        let predicted = forecast_next_price(&prices).unwrap();
        assert!((predicted - 100.0).abs() < 1e-9);
    }

    #[test]
    fn linear_series_extrapolates_one_step() {
        let prices = [10.0, 20.0, 30.0, 40.0];
        let predicted = forecast_next_price(&prices).unwrap();
        assert!((predicted - 50.0).abs() < 1e-9);
    }

    #[test]
    fn falling_trend_never_forecasts_below_zero() {
        let prices = [30.0, 20.0, 10.0, 0.0];
        let predicted = forecast_next_price(&prices).unwrap();
        assert_eq!(predicted, 0.0);
    }
}
