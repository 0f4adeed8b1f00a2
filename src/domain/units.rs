//! Address shape checks and amount scaling
//!
//! Amounts arrive from callers as human-scaled floats and leave as integer
//! smallest units. Scaling goes through `rust_decimal` so that values like
//! `0.1 SOL` land on exactly `100_000_000` lamports.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use thiserror::Error;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimal exponent of the native asset
pub const NATIVE_DECIMALS: u8 = 9;

/// Decimal exponent assumed for every non-native mint
pub const DEFAULT_TOKEN_DECIMALS: u8 = 6;

/// Wrapped SOL mint, used by the aggregators to denote the native asset
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// How decimals of non-native mints are determined when scaling swap amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalsPolicy {
    /// Every non-native mint is treated as having 6 decimals
    #[default]
    FixedAssumption,
    /// Query the mint's decimals from the node
    OnChain,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AmountError {
    #[error("Amount must be greater than 0, got {0}")]
    NotPositive(f64),
    #[error("Amount is not a finite number")]
    NotFinite,
    #[error("Amount {amount} with {decimals} decimals does not fit in 64 bits")]
    Overflow { amount: f64, decimals: u8 },
}

/// Check that `address` looks like a base58-encoded public key (32-44 chars
/// from the base58 alphabet). No curve-point check.
pub fn is_valid_address(address: &str) -> bool {
    (32..=44).contains(&address.len()) && address.chars().all(|c| BASE58_ALPHABET.contains(c))
}

pub fn is_native_mint(mint: &str) -> bool {
    mint == NATIVE_MINT
}

/// Decimals used for `mint` under the fixed assumption: 9 for native, 6 otherwise.
pub fn assumed_decimals(mint: &str) -> u8 {
    if is_native_mint(mint) {
        NATIVE_DECIMALS
    } else {
        DEFAULT_TOKEN_DECIMALS
    }
}

/// Scale a human amount to smallest units with an explicit exponent.
///
/// Sub-unit remainders are truncated toward zero.
pub fn to_smallest_unit(amount: f64, decimals: u8) -> Result<u64, AmountError> {
    if !amount.is_finite() {
        return Err(AmountError::NotFinite);
    }
    if amount < 0.0 {
        return Err(AmountError::NotPositive(amount));
    }

    let overflow = || AmountError::Overflow { amount, decimals };
    let value = Decimal::from_f64(amount).ok_or_else(overflow)?;
    let scale = Decimal::from_u64(10u64.checked_pow(decimals as u32).ok_or_else(overflow)?)
        .ok_or_else(overflow)?;

    value
        .checked_mul(scale)
        .and_then(|scaled| scaled.trunc().to_u64())
        .ok_or_else(overflow)
}

/// Scale a human amount to smallest units using the fixed per-mint assumption.
pub fn amount_to_smallest_unit(amount: f64, mint: &str) -> Result<u64, AmountError> {
    to_smallest_unit(amount, assumed_decimals(mint))
}

/// Scale a raw integer amount back to display units.
pub fn from_smallest_unit(raw: u64, decimals: u8) -> f64 {
    let scaled = Decimal::from(raw) / Decimal::from(10u64.pow(decimals.min(19) as u32));
    scaled.to_f64().unwrap_or(0.0)
}

/// Like [`from_smallest_unit`] but for the decimal strings aggregators return.
/// Unparseable input yields `0.0`.
pub fn raw_str_to_display(raw: &str, decimals: u8) -> f64 {
    raw.parse::<u64>()
        .map(|v| from_smallest_unit(v, decimals))
        .unwrap_or(0.0)
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    from_smallest_unit(lamports, NATIVE_DECIMALS)
}
