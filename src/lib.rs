//! solana-ops - Solana client operations library
//!
//! Balance, history and account queries over JSON-RPC with retry, swaps via
//! Jupiter or Raydium, and SOL/SPL transfers signed as versioned or legacy
//! transactions.
//!
//! # Modules
//!
//! - `domain`: Amount scaling, tokens, instruction encoding, priority-fee cache
//! - `ports`: Trait abstractions (TransportPort, SwapPort, PricePort, ItemSource)
//! - `adapters`: External implementations (Solana RPC, Jupiter, Raydium, CoinGecko, CLI)
//! - `config`: Configuration loading, validation and credentials
//! - `application`: Operation dispatcher and batch runner

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
