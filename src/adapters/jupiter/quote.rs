//! Jupiter Quote Types
//!
//! Response structure of the Jupiter `/quote` endpoint and its translation
//! into the provider-neutral [`Quote`].

use serde::{Deserialize, Serialize};

use crate::ports::models::{DexProvider, Quote};

/// Response from Jupiter quote API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    /// Input token mint address
    pub input_mint: String,
    /// Output token mint address
    pub output_mint: String,
    /// Input amount in base units
    pub in_amount: String,
    /// Output amount in base units
    pub out_amount: String,
    /// Minimum output amount after slippage (otherAmountThreshold)
    #[serde(default)]
    pub other_amount_threshold: String,
    #[serde(default)]
    pub swap_mode: String,
    pub slippage_bps: u16,
    /// Price impact percentage (as string)
    #[serde(default)]
    pub price_impact_pct: String,
    /// Route steps, passed through untouched
    #[serde(default)]
    pub route_plan: serde_json::Value,
    #[serde(default)]
    pub context_slot: Option<u64>,
}

impl QuoteResponse {
    pub fn input_amount(&self) -> u64 {
        self.in_amount.parse().unwrap_or(0)
    }

    pub fn price_impact(&self) -> f64 {
        self.price_impact_pct.parse().unwrap_or(0.0)
    }

    /// Normalize; `raw` is the untouched payload the `/swap` endpoint wants back
    pub fn into_quote(self, raw: serde_json::Value) -> Quote {
        Quote {
            provider: DexProvider::Jupiter,
            in_amount: self.input_amount(),
            price_impact_pct: self.price_impact(),
            route_plan: self.route_plan,
            input_mint: self.input_mint,
            output_mint: self.output_mint,
            out_amount: self.out_amount,
            slippage_bps: self.slippage_bps,
            raw,
        }
    }
}
