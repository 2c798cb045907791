use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::Result;
use crate::error::AppError;

/// Outcome of a conditional upsert against the price table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First observation of this URL.
    Inserted,
    /// New price was strictly lower, record updated.
    Updated { old_price: Decimal },
    /// New price was equal or higher, record left untouched.
    Unchanged { current: Decimal },
}

/// Durable URL -> last-stored-price mapping backed by SQLite.
///
/// The stored price is only ever overwritten by a strictly lower one, so it
/// behaves as a running minimum of observed prices, not the latest price.
pub struct PriceStore {
    pool: SqlitePool,
}

impl PriceStore {
    /// Open (and create if missing) the database and the prices table.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS prices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                price TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        info!(url, "price store ready");
        Ok(Self { pool })
    }

    pub async fn get(&self, url: &str) -> Result<Option<Decimal>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT price FROM prices WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((raw,)) => {
                let price = Decimal::from_str(&raw).map_err(|_| AppError::CorruptRecord {
                    url: url.to_string(),
                    value: raw,
                })?;
                Ok(Some(price))
            }
            None => Ok(None),
        }
    }

    /// Insert on first observation, update only on a strict decrease.
    ///
    /// Prices are stored as canonical decimal strings so 2-decimal currency
    /// values round-trip exactly. The UNIQUE constraint on `url` keeps the
    /// one-row-per-URL invariant even if callers race.
    pub async fn upsert_on_decrease(&self, url: &str, price: Decimal) -> Result<UpsertOutcome> {
        match self.get(url).await? {
            None => {
                sqlx::query("INSERT INTO prices (url, price) VALUES (?, ?)")
                    .bind(url)
                    .bind(price.to_string())
                    .execute(&self.pool)
                    .await?;
                Ok(UpsertOutcome::Inserted)
            }
            Some(stored) if price < stored => {
                sqlx::query("UPDATE prices SET price = ? WHERE url = ?")
                    .bind(price.to_string())
                    .bind(url)
                    .execute(&self.pool)
                    .await?;
                Ok(UpsertOutcome::Updated { old_price: stored })
            }
            Some(stored) => Ok(UpsertOutcome::Unchanged { current: stored }),
        }
    }
}
