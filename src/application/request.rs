//! Operation requests
//!
//! One variant per public operation. On the wire a request is a flat JSON
//! object tagged by `operation`, with camelCase parameters:
//!
//! ```json
//! { "operation": "getSwapQuote", "inputMint": "So111…", "outputMint": "EPjF…", "swapAmount": 0.5 }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::tokens::TokenType;
use crate::ports::models::DexProvider;

pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum OperationRequest {
    GetBalance(WalletParams),
    GetTokenBalance(TokenBalanceParams),
    GetTokenPrice(TokenPriceParams),
    GetTransactionHistory(HistoryParams),
    GetAccountInfo(WalletParams),
    GetSwapQuote(SwapParams),
    /// Build an unsigned swap transaction for the caller to sign
    ExecuteSwap(SwapParams),
    /// Build, sign and submit a swap
    ExecuteSwapAdvanced(SwapParams),
    SendToken(SendTokenParams),
}

impl OperationRequest {
    pub fn name(&self) -> &'static str {
        match self {
            OperationRequest::GetBalance(_) => "getBalance",
            OperationRequest::GetTokenBalance(_) => "getTokenBalance",
            OperationRequest::GetTokenPrice(_) => "getTokenPrice",
            OperationRequest::GetTransactionHistory(_) => "getTransactionHistory",
            OperationRequest::GetAccountInfo(_) => "getAccountInfo",
            OperationRequest::GetSwapQuote(_) => "getSwapQuote",
            OperationRequest::ExecuteSwap(_) => "executeSwap",
            OperationRequest::ExecuteSwapAdvanced(_) => "executeSwapAdvanced",
            OperationRequest::SendToken(_) => "sendToken",
        }
    }

    /// Operations that sign and therefore need the private key up front
    pub fn requires_private_key(&self) -> bool {
        matches!(
            self,
            OperationRequest::ExecuteSwapAdvanced(_) | OperationRequest::SendToken(_)
        )
    }
}

/// Wallet to inspect; defaults to the credentials' public key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub token_mint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPriceParams {
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,
}

fn default_token_symbol() -> String {
    "SOL".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

/// Shared by quote, build and execute. `priority_fee` is ignored when quoting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapParams {
    pub input_mint: String,
    pub output_mint: String,
    /// Display units of the input asset
    pub swap_amount: f64,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u16,
    #[serde(default)]
    pub priority_fee: u64,
    #[serde(default)]
    pub dex_provider: DexProvider,
}

fn default_slippage_bps() -> u16 {
    DEFAULT_SLIPPAGE_BPS
}

impl SwapParams {
    pub fn new(input_mint: impl Into<String>, output_mint: impl Into<String>, swap_amount: f64) -> Self {
        Self {
            input_mint: input_mint.into(),
            output_mint: output_mint.into(),
            swap_amount,
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
            priority_fee: 0,
            dex_provider: DexProvider::default(),
        }
    }

    pub fn with_provider(mut self, provider: DexProvider) -> Self {
        self.dex_provider = provider;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTokenParams {
    pub recipient_address: String,
    pub token_type: TokenType,
    /// Mint for `tokenType: CUSTOM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_token_mint: Option<String>,
    /// Display units
    pub send_amount: f64,
    /// Compute-unit price in micro-lamports; 0 adds no compute-budget instruction
    #[serde(default)]
    pub send_priority_fee: u64,
}
