mod product;
mod tracking;
mod trend;

pub use product::{PricePoint, ProductRecord, ProductSummary};
pub use tracking::{NotificationOutcome, TrackProductRequest, TrackProductResponse};
pub use trend::TrendReport;
