use reqwest::Client;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::debug;

use crate::Result;
use crate::config::FetcherConfig;

/// HTTP page fetcher with a bounded timeout and optional bounded retry.
///
/// One outbound GET per attempt. Network failures, timeouts, and non-2xx
/// statuses all surface as errors the caller can recover from per item.
pub struct PageFetcher {
    client: Client,
    retry_attempts: u32,
    retry_delay_ms: u64,
}

impl PageFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            retry_attempts: config.retry_attempts,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    /// Fetch the page body for `url` as text.
    ///
    /// With `retry_attempts` = 0 a single attempt is made; otherwise up to
    /// that many extra attempts follow at a fixed interval.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let strategy =
            FixedInterval::from_millis(self.retry_delay_ms).take(self.retry_attempts as usize);

        let response = Retry::spawn(strategy, || async {
            debug!(url, "sending GET request");
            let response = self.client.get(url).send().await?;
            response.error_for_status()
        })
        .await?;

        let body = response.text().await?;
        Ok(body)
    }
}
