//! SeaORM Entity for the market snapshot
//!
//! One row per tracked coin. The whole table is replaced on every ingestion
//! run; all rows of a run share the same `recorded_at`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "snapshot")]
pub struct Model {
    /// Coin name as reported by the provider (e.g. "Bitcoin")
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub symbol: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub price_change_pct_24h: Option<f64>,
    /// Logo URL
    pub image: Option<String>,
    /// Provider-supplied timestamp, stored verbatim
    pub last_updated: Option<String>,
    /// Ingestion timestamp, `YYYY-MM-DD HH:MM:SS` UTC
    pub recorded_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
