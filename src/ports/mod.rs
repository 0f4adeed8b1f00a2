//! Ports Layer - Trait definitions for external dependencies
//!
//! - JSON-RPC transport
//! - Swap execution (Jupiter, Raydium)
//! - USD price feed
//! - Batch host

pub mod execution;
pub mod host;
pub mod market_data;
pub mod mocks;
pub mod models;
pub mod transport;

pub use execution::{SwapError, SwapPort};
pub use host::{HostError, ItemSource};
pub use market_data::{PriceError, PricePort};
pub use models::{DexProvider, Quote, QuoteRequest, SwapBuild};
pub use transport::{TransportError, TransportPort};
