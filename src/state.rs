use std::sync::Arc;

use crate::external::mailer::Notifier;
use crate::external::scraper::ProductScraper;
use crate::store::ProductStore;

#[derive(Clone)]
pub struct AppState {
    pub store: ProductStore,
    pub scraper: Arc<dyn ProductScraper>,
    pub notifier: Arc<dyn Notifier>,
}
