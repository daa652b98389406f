use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Page size for `/coins/markets`. Page 1 only; assets beyond the first 100
/// are out of scope.
const PER_PAGE: u32 = 100;

#[derive(Clone)]
pub struct CoinGeckoService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// One entry of the `/coins/markets` response. Every field is optional; the
/// provider omits values it has no data for.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketEntry {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub price_change_24h: Option<f64>,
    #[serde(rename = "price_change_percentage_24h")]
    pub price_change_pct_24h: Option<f64>,
    pub image: Option<String>,
    pub last_updated: Option<String>,
}

#[derive(Debug)]
pub enum CoinGeckoError {
    /// Non-success HTTP status from the provider
    Status { status: StatusCode, body: String },
    /// Connect/timeout/DNS failure before a response arrived
    Transport(reqwest::Error),
    /// Response body did not parse as a market listing
    Malformed(String),
}

impl fmt::Display for CoinGeckoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinGeckoError::Status { status, body } => {
                write!(f, "CoinGecko API error {}: {}", status, body)
            }
            CoinGeckoError::Transport(e) => write!(f, "CoinGecko request failed: {}", e),
            CoinGeckoError::Malformed(e) => {
                write!(f, "CoinGecko returned an unparsable response: {}", e)
            }
        }
    }
}

impl std::error::Error for CoinGeckoError {}

impl CoinGeckoService {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap(),
            base_url,
            api_key,
        }
    }

    /// Fetch page 1 of the coins ranked by market cap descending.
    pub async fn fetch_top_markets(&self) -> Result<Vec<MarketEntry>, CoinGeckoError> {
        tracing::info!("Fetching top {} coins from CoinGecko", PER_PAGE);

        let url = format!("{}/coins/markets", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(&[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", &PER_PAGE.to_string()),
                ("page", "1"),
                ("sparkline", "false"),
            ]);

        if let Some(key) = &self.api_key {
            request = request.header("x-cg-pro-api-key", key);
        }

        let response = request.send().await.map_err(CoinGeckoError::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CoinGeckoError::Status {
                status,
                body: error_text,
            });
        }

        let raw = response.text().await.map_err(CoinGeckoError::Transport)?;
        let entries: Vec<MarketEntry> =
            serde_json::from_str(&raw).map_err(|e| CoinGeckoError::Malformed(e.to_string()))?;

        tracing::info!("Fetched {} market entries from CoinGecko", entries.len());

        Ok(entries)
    }
}
