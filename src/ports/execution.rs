use async_trait::async_trait;
use thiserror::Error;

use super::models::{DexProvider, Quote, QuoteRequest, SwapBuild};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SwapError {
    #[error("{provider} quote failed: {message} (input: {input_mint} -> output: {output_mint}, amount: {amount}, slippage: {slippage_bps}bps)")]
    Quote {
        provider: DexProvider,
        message: String,
        input_mint: String,
        output_mint: String,
        amount: u64,
        slippage_bps: u16,
    },
    #[error("{provider} swap build failed: {message}")]
    SwapBuild { provider: DexProvider, message: String },
}

impl SwapError {
    pub fn quote(provider: DexProvider, request: &QuoteRequest, message: impl Into<String>) -> Self {
        SwapError::Quote {
            provider,
            message: message.into(),
            input_mint: request.input_mint.clone(),
            output_mint: request.output_mint.clone(),
            amount: request.amount,
            slippage_bps: request.slippage_bps,
        }
    }

    pub fn swap_build(provider: DexProvider, message: impl Into<String>) -> Self {
        SwapError::SwapBuild {
            provider,
            message: message.into(),
        }
    }

    pub fn provider(&self) -> DexProvider {
        match self {
            SwapError::Quote { provider, .. } | SwapError::SwapBuild { provider, .. } => *provider,
        }
    }
}

/// A DEX aggregator able to quote and build swap transactions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapPort: Send + Sync {
    fn provider(&self) -> DexProvider;

    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError>;

    /// Build an unsigned swap transaction for `payer`. A `priority_fee` of 0
    /// leaves the fee to the provider.
    async fn get_swap_transaction(
        &self,
        quote: &Quote,
        payer: &str,
        priority_fee: u64,
    ) -> Result<SwapBuild, SwapError>;
}
