//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Solana: JSON-RPC client, wallet, transaction builder and submitter
//! - Jupiter: DEX aggregator API client
//! - Raydium: Trade API client with priority-fee cache
//! - Market Data: CoinGecko price feed
//! - CLI: Command-line interface handlers

pub mod cli;
pub mod jupiter;
pub mod market_data;
pub mod raydium;
pub mod solana;

pub use cli::CliApp;
pub use jupiter::JupiterClient;
pub use market_data::CoinGeckoClient;
pub use raydium::RaydiumClient;
pub use solana::{SolanaClient, WalletManager};
