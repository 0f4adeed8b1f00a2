//! JSON-RPC result shapes consumed by the client

use serde::{Deserialize, Serialize};
use solana_sdk::hash::Hash;

/// `{ context, value }` wrapper used by most node methods. The context is
/// not needed and is allowed to be absent.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcValue<T> {
    pub value: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcTokenSupply {
    pub decimals: u8,
}

/// Blockhash plus the last block height at which it is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Entry of `getSignaturesForAddress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
}

/// Fee and outcome of a confirmed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionSummary {
    pub fee: Option<u64>,
    pub success: bool,
}

impl TransactionSummary {
    /// Read `meta.fee` / `meta.err` from a `getTransaction` result
    pub fn from_result(tx: &serde_json::Value) -> Self {
        let meta = &tx["meta"];
        Self {
            fee: meta["fee"].as_u64(),
            success: meta.is_object() && meta["err"].is_null(),
        }
    }
}

/// `tokenAmount` of a jsonParsed SPL token account
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub amount: String,
    pub decimals: u8,
    #[serde(default)]
    pub ui_amount_string: Option<String>,
}

impl TokenAmount {
    /// Extract from a `getTokenAccountsByOwner` entry (jsonParsed encoding)
    pub fn from_keyed_account(account: &serde_json::Value) -> Option<Self> {
        let amount = account
            .pointer("/account/data/parsed/info/tokenAmount")?
            .clone();
        serde_json::from_value(amount).ok()
    }
}
