pub mod mailer;
pub mod scraper;
