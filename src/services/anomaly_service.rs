/// Fraction of the series expected to be anomalous, matching the 10%
/// contamination rate the tracker has always assumed.
pub const DEFAULT_ANOMALY_FRACTION: f64 = 0.1;

/// Score floor for the modified z-score; the conventional cutoff for
/// median/MAD based outlier detection.
const SCORE_FLOOR: f64 = 3.5;

/// Flag indices whose price is statistically inconsistent with the rest of
/// the series.
///
/// Scores each value with a modified z-score (distance from the median,
/// scaled by the median absolute deviation, with a mean-absolute-deviation
/// fallback when the MAD collapses to zero). Values clearing the score floor
/// are ranked and at most ceil(fraction * n) of them are returned, so the
/// result is deterministic for repeated calls: a single value far outside the
/// range of the rest is always flagged, and a near-constant series yields
/// nothing.
///
/// Fewer than two observations is a defined empty result, not an error.
pub fn detect_price_anomalies(prices: &[f64], expected_fraction: f64) -> Vec<usize> {
    let n = prices.len();
    if n < 2 {
        return Vec::new();
    }

    let median = median_of(prices);

    let mut abs_deviations: Vec<f64> = prices.iter().map(|&p| (p - median).abs()).collect();
    let mad = median_of(&abs_deviations);

    // Zero MAD means at least half the values sit exactly on the median;
    // fall back to the mean absolute deviation so a lone extreme value in an
    // otherwise constant series still scores.
    let scale = if mad > 0.0 {
        mad / 0.6745
    } else {
        abs_deviations.iter().sum::<f64>() / n as f64
    };

    if scale <= 0.0 {
        // All values identical; nothing can be inconsistent.
        return Vec::new();
    }

    abs_deviations.iter_mut().for_each(|d| *d /= scale);
    let scores = abs_deviations;

    let mut candidates: Vec<usize> = (0..n).filter(|&i| scores[i] > SCORE_FLOOR).collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    // Highest score first; ties break toward the earlier observation.
    candidates.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let cap = ((n as f64) * expected_fraction).ceil().max(1.0) as usize;
    candidates.truncate(cap);
    candidates.sort_unstable();
    candidates
}

fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_short_series_is_never_anomalous() {
        assert!(detect_price_anomalies(&[], DEFAULT_ANOMALY_FRACTION).is_empty());
        assert!(detect_price_anomalies(&[500.0], DEFAULT_ANOMALY_FRACTION).is_empty());
    }

    #[test]
    fn constant_series_is_clean() {
        let prices = [100.0, 100.0, 100.0, 100.0];
        assert!(detect_price_anomalies(&prices, DEFAULT_ANOMALY_FRACTION).is_empty());
    }

    #[test]
    fn near_identical_series_is_clean() {
        let prices = [99.9, 100.0, 100.1, 100.0, 99.8];
        assert!(detect_price_anomalies(&prices, DEFAULT_ANOMALY_FRACTION).is_empty());
    }

    #[test]
    fn extreme_spike_is_flagged() {
        let prices = [10.0, 10.0, 11.0, 9.0, 10.0, 500.0];
        let anomalies = detect_price_anomalies(&prices, DEFAULT_ANOMALY_FRACTION);
        assert!(anomalies.contains(&5));
    }

    #[test]
    fn spike_in_constant_series_is_flagged() {
        // MAD is zero here; the fallback scale has to catch the spike.
        let prices = [10.0, 10.0, 10.0, 10.0, 10.0, 200.0];
        let anomalies = detect_price_anomalies(&prices, DEFAULT_ANOMALY_FRACTION);
        assert_eq!(anomalies, vec![5]);
    }

    #[test]
    fn repeated_calls_agree() {
        let prices = [10.0, 10.0, 11.0, 9.0, 10.0, 500.0];
        let first = detect_price_anomalies(&prices, DEFAULT_ANOMALY_FRACTION);
        let second = detect_price_anomalies(&prices, DEFAULT_ANOMALY_FRACTION);
        assert_eq!(first, second);
    }

    #[test]
    fn fraction_caps_the_result() {
        let prices = [
            10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 500.0, 600.0,
        ];
        let anomalies = detect_price_anomalies(&prices, DEFAULT_ANOMALY_FRACTION);
        // ceil(10 * 0.1) = 1, so only the most extreme index survives.
        assert_eq!(anomalies, vec![9]);
    }
}
