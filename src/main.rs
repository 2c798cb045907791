use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use pricewatch::config::AppConfig;
use pricewatch::extractor::ExtractorRegistry;
use pricewatch::fetcher::PageFetcher;
use pricewatch::notifier::TelegramNotifier;
use pricewatch::store::PriceStore;
use pricewatch::tracker::Tracker;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pricewatch=info".parse()?),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!(
        items = config.items.len(),
        interval_secs = config.tracker.check_interval,
        "starting pricewatch"
    );

    // Durable state is required; failing here is fatal.
    let store = PriceStore::connect(&config.database.url).await?;

    let fetcher = PageFetcher::new(&config.fetcher)?;
    let extractors = ExtractorRegistry::from_config(&config.sites)?;
    let notifier = Arc::new(TelegramNotifier::new(&config.telegram)?);

    let tracker = Tracker::new(
        fetcher,
        extractors,
        store,
        notifier,
        config.items.clone(),
        Duration::from_secs(config.tracker.check_interval),
        config.tracker.currency.clone(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    tracker.run(shutdown_rx).await;
    info!("shutting down");

    Ok(())
}
