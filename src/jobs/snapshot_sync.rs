use chrono::Utc;
use reqwest::StatusCode;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait};
use std::fmt;

use crate::entities::{prelude::*, snapshot};
use crate::services::coingecko::{CoinGeckoError, CoinGeckoService};

#[derive(Debug)]
pub enum IngestionError {
    /// Provider returned a non-success status, or could not be reached at all
    ProviderUnavailable {
        status: Option<StatusCode>,
        detail: String,
    },
    /// Provider responded but the body was unparsable
    ProviderMalformedResponse(String),
    Database(DbErr),
}

impl fmt::Display for IngestionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestionError::ProviderUnavailable {
                status: Some(status),
                detail,
            } => write!(f, "market data provider unavailable ({}): {}", status, detail),
            IngestionError::ProviderUnavailable {
                status: None,
                detail,
            } => write!(f, "market data provider unreachable: {}", detail),
            IngestionError::ProviderMalformedResponse(detail) => {
                write!(f, "market data provider returned a malformed response: {}", detail)
            }
            IngestionError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for IngestionError {}

impl From<CoinGeckoError> for IngestionError {
    fn from(err: CoinGeckoError) -> Self {
        match err {
            CoinGeckoError::Status { status, body } => IngestionError::ProviderUnavailable {
                status: Some(status),
                detail: body,
            },
            CoinGeckoError::Transport(e) => IngestionError::ProviderUnavailable {
                status: None,
                detail: e.to_string(),
            },
            CoinGeckoError::Malformed(detail) => IngestionError::ProviderMalformedResponse(detail),
        }
    }
}

impl From<DbErr> for IngestionError {
    fn from(err: DbErr) -> Self {
        IngestionError::Database(err)
    }
}

/// Replace the stored snapshot with the provider's current top listing.
///
/// The delete and all inserts run in one transaction: readers see the
/// previous snapshot until commit, never a partially replaced table. Any
/// fetch error aborts before the store is touched. Returns the number of
/// rows stored.
pub async fn refresh_snapshot(
    db: &DatabaseConnection,
    coingecko: &CoinGeckoService,
) -> Result<usize, IngestionError> {
    let entries = coingecko.fetch_top_markets().await?;

    // One timestamp per run, shared by every row
    let recorded_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut rows = Vec::with_capacity(entries.len());
    let mut dropped = 0usize;

    for entry in entries {
        // An entry without a name has no usable key
        let name = match entry.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                dropped += 1;
                continue;
            }
        };

        rows.push(snapshot::ActiveModel {
            name: Set(name),
            symbol: Set(entry.symbol),
            current_price: Set(entry.current_price),
            market_cap: Set(entry.market_cap),
            total_volume: Set(entry.total_volume),
            price_change_24h: Set(entry.price_change_24h),
            price_change_pct_24h: Set(entry.price_change_pct_24h),
            image: Set(entry.image),
            last_updated: Set(entry.last_updated),
            recorded_at: Set(recorded_at.clone()),
        });
    }

    if dropped > 0 {
        tracing::warn!("Skipped {} provider entries without a usable name", dropped);
    }

    let stored = rows.len();

    let txn = db.begin().await?;
    Snapshot::delete_many().exec(&txn).await?;
    if !rows.is_empty() {
        Snapshot::insert_many(rows).exec(&txn).await?;
    }
    txn.commit().await?;

    Ok(stored)
}

/// Startup ingestion: runs once before the server accepts traffic. A failed
/// refresh leaves the store in its prior state (possibly empty) and the
/// process still starts serving.
pub async fn run_startup_refresh(db: &DatabaseConnection, coingecko: &CoinGeckoService) {
    tracing::info!("Running initial market snapshot refresh");
    match refresh_snapshot(db, coingecko).await {
        Ok(count) => tracing::info!("Stored snapshot of {} coins", count),
        Err(e) => tracing::error!("Failed to refresh market snapshot on startup: {}", e),
    }
}
