use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;

/// Name/price pair extracted from a product page.
#[derive(Debug, Clone)]
pub struct ScrapedProduct {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("network error: {0}")]
    Network(String),

    #[error("could not extract product details")]
    Extraction,
}

/// Black-box page fetcher. The core consumes the pair or a clean failure and
/// never retries on its own.
#[async_trait]
pub trait ProductScraper: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ScrapedProduct, ScrapeError>;
}

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Scraper for Amazon-style product pages: the title lives in a
/// `span#productTitle` element and the price in a `span.a-price-whole`.
pub struct HttpScraper {
    client: reqwest::Client,
    title_re: Regex,
    price_re: Regex,
}

impl HttpScraper {
    pub fn new() -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .build()
            .map_err(|e| ScrapeError::Network(e.to_string()))?;

        let title_re = Regex::new(r#"<span[^>]*id="productTitle"[^>]*>([^<]+)</span>"#)
            .map_err(|_| ScrapeError::Extraction)?;
        let price_re = Regex::new(r#"<span[^>]*class="[^"]*a-price-whole[^"]*"[^>]*>([\d,]+(?:\.\d+)?)"#)
            .map_err(|_| ScrapeError::Extraction)?;

        Ok(Self {
            client,
            title_re,
            price_re,
        })
    }

    /// Pull the (name, price) pair out of a fetched page body.
    fn extract_details(&self, html: &str) -> Option<ScrapedProduct> {
        let name = self
            .title_re
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())?;

        let price = self
            .price_re
            .captures(html)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())?;

        if name.is_empty() || !price.is_finite() || price < 0.0 {
            return None;
        }

        Some(ScrapedProduct { name, price })
    }
}

#[async_trait]
impl ProductScraper for HttpScraper {
    async fn fetch(&self, url: &str) -> Result<ScrapedProduct, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::Network(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::Network(e.to_string()))?;

        self.extract_details(&body).ok_or(ScrapeError::Extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> HttpScraper {
        HttpScraper::new().unwrap()
    }

    #[test]
    fn extracts_name_and_price() {
        let html = r#"
            <span id="productTitle" class="a-size-large"> Noise Cancelling Headphones </span>
            <span class="a-price-whole">12,499</span>
        "#;
        let product = scraper().extract_details(html).unwrap();
        assert_eq!(product.name, "Noise Cancelling Headphones");
        assert_eq!(product.price, 12499.0);
    }

    #[test]
    fn extracts_fractional_price() {
        let html = r#"
            <span id="productTitle">USB Cable</span>
            <span class="a-price-whole">9.99</span>
        "#;
        let product = scraper().extract_details(html).unwrap();
        assert_eq!(product.price, 9.99);
    }

    #[test]
    fn missing_title_fails_extraction() {
        let html = r#"<span class="a-price-whole">100</span>"#;
        assert!(scraper().extract_details(html).is_none());
    }

    #[test]
    fn missing_price_fails_extraction() {
        let html = r#"<span id="productTitle">Mystery Item</span>"#;
        assert!(scraper().extract_details(html).is_none());
    }
}
