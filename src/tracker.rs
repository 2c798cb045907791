use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::TrackedItem;
use crate::extractor::ExtractorRegistry;
use crate::fetcher::PageFetcher;
use crate::notifier::{Notifier, PriceAlert};
use crate::store::{PriceStore, UpsertOutcome};

/// How one tracked URL's check ended within a cycle.
///
/// Every variant is terminal for that URL until the next cycle; failures
/// never propagate to the other items on the list.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Network failure, timeout, or non-2xx status. Skipped this cycle.
    FetchFailed,
    /// Page fetched but no price could be extracted.
    NoPrice,
    /// Storage failed for this URL mid-cycle. Skipped this cycle.
    StoreFailed,
    /// First observation, recorded without an alert.
    FirstSeen(Decimal),
    /// Price equal to or above the stored value, nothing to do.
    Unchanged(Decimal),
    /// Strict decrease: store updated, alert attempted.
    PriceDrop {
        old_price: Decimal,
        new_price: Decimal,
        notified: bool,
    },
}

/// Orchestrates the per-URL pipeline: fetch, extract, compare against the
/// store, alert on decrease. Holds no state of its own across cycles.
pub struct Tracker {
    fetcher: PageFetcher,
    extractors: ExtractorRegistry,
    store: PriceStore,
    notifier: Arc<dyn Notifier>,
    items: Vec<TrackedItem>,
    interval: Duration,
    currency: String,
}

impl Tracker {
    pub fn new(
        fetcher: PageFetcher,
        extractors: ExtractorRegistry,
        store: PriceStore,
        notifier: Arc<dyn Notifier>,
        items: Vec<TrackedItem>,
        interval: Duration,
        currency: String,
    ) -> Self {
        Self {
            fetcher,
            extractors,
            store,
            notifier,
            items,
            interval,
            currency,
        }
    }

    /// Run one tracked URL through the pipeline.
    pub async fn check_item(&self, url: &str) -> CheckOutcome {
        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(url, error = %e, "fetch failed, skipping this cycle");
                return CheckOutcome::FetchFailed;
            }
        };

        let price = match self.extractors.for_url(url).extract(&body) {
            Some(price) => price,
            None => {
                warn!(url, "no price found on page");
                return CheckOutcome::NoPrice;
            }
        };

        let outcome = match self.store.upsert_on_decrease(url, price).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(url, error = %e, "price store error, skipping this cycle");
                return CheckOutcome::StoreFailed;
            }
        };

        match outcome {
            UpsertOutcome::Inserted => {
                info!(url, price = %price, "first observation recorded");
                CheckOutcome::FirstSeen(price)
            }
            UpsertOutcome::Unchanged { current } => {
                debug!(url, price = %price, stored = %current, "no decrease");
                CheckOutcome::Unchanged(current)
            }
            UpsertOutcome::Updated { old_price } => {
                info!(url, old = %old_price, new = %price, "price drop detected");

                // The store is already updated; a failed send must not
                // roll that back. Alerts are best effort.
                let alert = PriceAlert {
                    url: url.to_string(),
                    old_price,
                    new_price: price,
                    currency: self.currency.clone(),
                };
                let notified = match self.notifier.notify(&alert).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(url, error = %e, "notification failed");
                        false
                    }
                };

                CheckOutcome::PriceDrop {
                    old_price,
                    new_price: price,
                    notified,
                }
            }
        }
    }

    /// One full pass over the tracked list, strictly in list order.
    pub async fn run_cycle(&self) -> Vec<CheckOutcome> {
        let mut outcomes = Vec::with_capacity(self.items.len());
        for item in &self.items {
            outcomes.push(self.check_item(&item.url).await);
        }
        outcomes
    }

    /// Loop forever: cycle, then sleep for the configured interval. The
    /// shutdown signal interrupts the sleep so termination never waits a
    /// full interval.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            items = self.items.len(),
            interval_secs = self.interval.as_secs(),
            "tracker started"
        );

        loop {
            let outcomes = self.run_cycle().await;
            debug!(checked = outcomes.len(), "cycle complete");

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => {
                    info!("shutdown signal received, stopping tracker");
                    return;
                }
            }
        }
    }
}
