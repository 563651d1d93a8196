use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricewatch_backend::app;
use pricewatch_backend::db::product_queries;
use pricewatch_backend::external::mailer::{LogNotifier, Notifier, SmtpNotifier};
use pricewatch_backend::external::scraper::HttpScraper;
use pricewatch_backend::state::AppState;
use pricewatch_backend::store::ProductStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://products.db?mode=rwc".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    product_queries::init_schema(&pool).await?;

    let store = ProductStore::new(pool);
    store.load_from_db().await?;

    let scraper = Arc::new(HttpScraper::new()?);

    // SMTP delivery is opt-in; without it, notifications land in the log.
    let smtp_enabled = std::env::var("SMTP_ENABLED")
        .unwrap_or_else(|_| "false".to_string())
        .to_lowercase()
        == "true";

    let notifier: Arc<dyn Notifier> = if smtp_enabled {
        tracing::info!("📧 Using SMTP notifier");
        Arc::new(SmtpNotifier::from_env()?)
    } else {
        tracing::info!("📧 SMTP disabled, notifications will be logged");
        Arc::new(LogNotifier)
    };

    let state = AppState {
        store,
        scraper,
        notifier,
    };
    let app = app::create_app(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Price Watch backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
