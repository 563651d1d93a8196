use crate::external::mailer::{Notifier, NotifyError};

/// A notification fires whenever the latest price is at or below the
/// user's threshold, on every ingestion that satisfies it. Repeat firing is
/// intended: the user keeps hearing about a price that stays good.
pub fn threshold_met(price: f64, threshold: f64) -> bool {
    price <= threshold
}

/// Send the threshold notification for one product. Delivery failures are the
/// caller's to report; the price append that triggered this has already
/// committed and stays committed.
pub async fn notify_price_drop(
    notifier: &dyn Notifier,
    recipient: &str,
    product_name: &str,
    price: f64,
    threshold: f64,
) -> Result<(), NotifyError> {
    let subject = format!("Price alert: {product_name}");
    let body = format!(
        "Your product '{product_name}' is now {price:.2}, at or below your \
         threshold of {threshold:.2}."
    );
    notifier.send(recipient, &subject, &body).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_at_or_below_threshold() {
        assert!(threshold_met(99.99, 100.0));
        assert!(threshold_met(100.0, 100.0));
    }

    #[test]
    fn does_not_fire_above_threshold() {
        assert!(!threshold_met(100.01, 100.0));
    }
}
