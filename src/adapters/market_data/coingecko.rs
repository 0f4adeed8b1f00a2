use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::loader::DEFAULT_PRICE_API_URL;
use crate::ports::market_data::{PriceError, PricePort};

/// CoinGecko `simple/price` client
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: Client,
    api_url: String,
}

/// `{ "<id>": { "usd": 123.4 } }`
type PriceResponse = HashMap<String, HashMap<String, f64>>;

impl CoinGeckoClient {
    pub fn new() -> Result<Self, PriceError> {
        Self::with_url(DEFAULT_PRICE_API_URL)
    }

    pub fn with_url(api_url: impl Into<String>) -> Result<Self, PriceError> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
        })
    }
}

/// Map common ticker symbols to CoinGecko ids; anything else is used lowercased
pub fn coingecko_id(symbol: &str) -> String {
    match symbol.trim().to_ascii_uppercase().as_str() {
        "SOL" => "solana".to_string(),
        "USDC" => "usd-coin".to_string(),
        "USDT" => "tether".to_string(),
        _ => symbol.trim().to_ascii_lowercase(),
    }
}

#[async_trait]
impl PricePort for CoinGeckoClient {
    async fn usd_price(&self, symbol: &str) -> Result<Option<f64>, PriceError> {
        let id = coingecko_id(symbol);
        let url = format!("{}/simple/price", self.api_url);

        let response = self
            .http
            .get(&url)
            .query(&[("ids", id.as_str()), ("vs_currencies", "usd")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PriceError::Status(response.status().as_u16()));
        }

        let prices: PriceResponse = response.json().await?;
        Ok(prices.get(&id).and_then(|p| p.get("usd")).copied())
    }
}
