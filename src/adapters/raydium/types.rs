//! Raydium Trade API response envelopes
//!
//! Every endpoint answers `{ id, success, version, msg?, data }`; `msg` carries
//! the failure reason when `success` is false.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ports::models::{DexProvider, Quote};

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Payload of a successful envelope, otherwise the provider message
    pub fn into_data(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(self.msg.unwrap_or_else(|| "Unknown error".to_string())),
        }
    }
}

/// `data` of `/compute/swap-base-in`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeSwap {
    #[serde(default)]
    pub swap_type: String,
    pub input_mint: String,
    pub input_amount: String,
    pub output_mint: String,
    pub output_amount: String,
    #[serde(default)]
    pub other_amount_threshold: String,
    pub slippage_bps: u16,
    #[serde(default)]
    pub price_impact_pct: f64,
    #[serde(default)]
    pub route_plan: Value,
}

impl ComputeSwap {
    /// Normalize; `envelope` is the whole compute response, which the
    /// transaction endpoint expects back verbatim as `swapResponse`
    pub fn into_quote(self, envelope: Value) -> Quote {
        Quote {
            provider: DexProvider::Raydium,
            in_amount: self.input_amount.parse().unwrap_or(0),
            input_mint: self.input_mint,
            output_mint: self.output_mint,
            out_amount: self.output_amount,
            price_impact_pct: self.price_impact_pct,
            route_plan: self.route_plan,
            slippage_bps: self.slippage_bps,
            raw: envelope,
        }
    }
}

/// `data` of `/compute/priority-fee`; `h` is the "high" tier
#[derive(Debug, Clone, Deserialize)]
pub struct PriorityFeeData {
    pub default: PriorityFeeTiers,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriorityFeeTiers {
    #[serde(default)]
    pub vh: Option<u64>,
    pub h: Option<u64>,
    #[serde(default)]
    pub m: Option<u64>,
}

/// Body of `/transaction/swap-base-in`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransactionRequest {
    pub compute_unit_price_micro_lamports: String,
    pub swap_response: Value,
    pub tx_version: String,
    pub wallet: String,
    pub wrap_sol: bool,
    pub unwrap_sol: bool,
}

/// One entry of the transaction endpoint's `data` array
#[derive(Debug, Clone, Deserialize)]
pub struct SwapTransactionData {
    pub transaction: String,
}
