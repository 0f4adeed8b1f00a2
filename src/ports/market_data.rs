use async_trait::async_trait;
use thiserror::Error;

/// Price lookup error type
#[derive(Error, Debug)]
pub enum PriceError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Price API returned status {0}")]
    Status(u16),

    #[error("Data parsing error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for PriceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PriceError::Parse(err.to_string())
        } else {
            PriceError::Http(err.to_string())
        }
    }
}

/// Single-asset USD price feed
#[async_trait]
pub trait PricePort: Send + Sync {
    /// USD price for `symbol` (a price-index id such as `solana`).
    /// `Ok(None)` means the index has no entry for the symbol.
    async fn usd_price(&self, symbol: &str) -> Result<Option<f64>, PriceError>;
}
