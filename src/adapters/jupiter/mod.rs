//! Jupiter Adapter
//!
//! [`SwapPort`](crate::ports::execution::SwapPort) implementation for the
//! Jupiter aggregator: quote fetching and swap transaction building.

mod client;
mod quote;
mod swap;

pub use client::{JupiterClient, JupiterConfig};
pub use quote::QuoteResponse;
pub use swap::{PrioritizationFee, SwapRequest, SwapResponse};
