//! Per-operation result records
//!
//! Monetary values are reported twice: a display amount (`f64`) and the raw
//! smallest-unit integer as a decimal string (`*Raw`). `balanceLamports` is
//! the one raw value kept numeric.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::adapters::solana::TransactionType;
use crate::domain::tokens::TokenType;
use crate::ports::models::DexProvider;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum OperationOutput {
    GetBalance(BalanceOutput),
    GetTokenBalance(TokenBalanceOutput),
    GetTokenPrice(TokenPriceOutput),
    GetTransactionHistory(HistoryOutput),
    GetAccountInfo(AccountInfoOutput),
    GetSwapQuote(SwapQuoteOutput),
    ExecuteSwap(SwapTransactionOutput),
    ExecuteSwapAdvanced(SwapSubmittedOutput),
    SendToken(SendTokenOutput),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    TransactionReady,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceOutput {
    pub wallet_address: String,
    pub balance: f64,
    pub balance_lamports: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceOutput {
    pub wallet_address: String,
    pub token_mint: String,
    pub balance: f64,
    pub balance_raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPriceOutput {
    pub symbol: String,
    pub price: f64,
    pub found: bool,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub confirmation_status: Option<String>,
    pub fee: Option<u64>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryOutput {
    pub wallet_address: String,
    pub transactions: Vec<HistoryEntry>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfoOutput {
    pub wallet_address: String,
    pub account_info: Option<Value>,
    pub exists: bool,
}

/// Amounts common to every swap result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSummary {
    pub dex: DexProvider,
    pub input_mint: String,
    pub output_mint: String,
    pub input_amount: f64,
    pub input_amount_raw: String,
    pub output_amount: f64,
    pub output_amount_raw: String,
    pub price_impact_pct: f64,
    pub slippage_bps: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuoteOutput {
    #[serde(flatten)]
    pub summary: SwapSummary,
    pub route_plan: Value,
    pub quote: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransactionOutput {
    #[serde(flatten)]
    pub summary: SwapSummary,
    /// Unsigned base64 transaction
    pub swap_transaction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_valid_block_height: Option<u64>,
    pub priority_fee: u64,
    pub status: OperationStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSubmittedOutput {
    #[serde(flatten)]
    pub summary: SwapSummary,
    pub signature: String,
    pub transaction_type: TransactionType,
    pub priority_fee: u64,
    pub status: OperationStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTokenOutput {
    pub signature: String,
    pub from: String,
    pub to: String,
    pub token_type: TokenType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_mint: Option<String>,
    pub amount: f64,
    pub amount_raw: String,
    pub priority_fee: u64,
    pub transaction_type: TransactionType,
    pub status: OperationStatus,
    pub timestamp: DateTime<Utc>,
}
