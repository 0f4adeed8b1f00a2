//! Provider-neutral swap data structures shared by all swap ports

use serde::{Deserialize, Serialize};

/// DEX aggregator that produced a quote or swap transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DexProvider {
    #[default]
    Jupiter,
    Raydium,
}

impl DexProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            DexProvider::Jupiter => "jupiter",
            DexProvider::Raydium => "raydium",
        }
    }
}

impl std::fmt::Display for DexProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DexProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jupiter" => Ok(DexProvider::Jupiter),
            "raydium" => Ok(DexProvider::Raydium),
            other => Err(format!("unknown dex provider '{}'", other)),
        }
    }
}

/// Quote parameters, amounts already in smallest units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: u64,
    /// Slippage tolerance in basis points (1 = 0.01%)
    pub slippage_bps: u16,
}

impl QuoteRequest {
    pub fn new(input_mint: impl Into<String>, output_mint: impl Into<String>, amount: u64, slippage_bps: u16) -> Self {
        Self {
            input_mint: input_mint.into(),
            output_mint: output_mint.into(),
            amount,
            slippage_bps,
        }
    }
}

/// Normalized quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub provider: DexProvider,
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: u64,
    /// Kept as a decimal string so large outputs survive JSON consumers
    pub out_amount: String,
    pub price_impact_pct: f64,
    /// Provider-specific route description
    pub route_plan: serde_json::Value,
    pub slippage_bps: u16,
    /// Untouched provider payload, needed again to build the swap
    pub raw: serde_json::Value,
}

impl Quote {
    /// Output amount as u64 (0 if unparseable)
    pub fn out_amount_u64(&self) -> u64 {
        self.out_amount.parse().unwrap_or(0)
    }
}

/// Unsigned swap transaction returned by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapBuild {
    pub provider: DexProvider,
    /// Base64 wire transaction, not yet signed by the user
    pub transaction_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_valid_block_height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prioritization_fee_lamports: Option<u64>,
}
