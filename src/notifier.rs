use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::Result;
use crate::config::TelegramConfig;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Ephemeral alert describing one observed price decrease. Built only to
/// format the outbound message and dropped after the send attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlert {
    pub url: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub currency: String,
}

impl PriceAlert {
    pub fn message(&self) -> String {
        format!(
            "Price dropped! {}\nOld price: {} {}\nNew price: {} {}",
            self.url, self.old_price, self.currency, self.new_price, self.currency
        )
    }
}

/// Outbound notification channel. Delivery failures are reported to the
/// caller but must never abort the tracking cycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &PriceAlert) -> Result<()>;
}

/// Sends alerts to a single statically configured Telegram chat.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        Self::with_api_base(config, TELEGRAM_API_BASE)
    }

    pub fn with_api_base(config: &TelegramConfig, api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, alert: &PriceAlert) -> Result<()> {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": alert.message(),
        });

        debug!(url = %alert.url, "sending Telegram alert");
        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await?;
        response.error_for_status()?;

        Ok(())
    }
}
