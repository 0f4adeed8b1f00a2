//! Raydium Adapter
//!
//! [`SwapPort`](crate::ports::execution::SwapPort) implementation for the
//! Raydium Trade API, including its cached priority-fee suggestion.

mod client;
mod types;

pub use client::{RaydiumClient, RaydiumConfig};
pub use types::{ComputeSwap, SwapTransactionRequest};
