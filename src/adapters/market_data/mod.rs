//! Market Data Adapters
//!
//! - `CoinGeckoClient`: single-asset USD price lookups

mod coingecko;

pub use coingecko::{coingecko_id, CoinGeckoClient};
