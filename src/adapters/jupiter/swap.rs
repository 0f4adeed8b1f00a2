//! Jupiter Swap Types
//!
//! Request and response structures for the Jupiter `/swap` endpoint.

use serde::{Deserialize, Serialize};

/// Request body for building a swap transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// User's public key (wallet address)
    pub user_public_key: String,
    /// The full quote response from /quote endpoint
    pub quote_response: serde_json::Value,
    pub wrap_and_unwrap_sol: bool,
    pub dynamic_compute_unit_limit: bool,
    /// Capped priority fee; omitted to let Jupiter pick
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioritization_fee_lamports: Option<PrioritizationFee>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizationFee {
    pub priority_level_with_max_lamports: PriorityLevelWithMaxLamports,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityLevelWithMaxLamports {
    pub priority_level: String,
    pub max_lamports: u64,
}

impl SwapRequest {
    pub fn new(user_public_key: String, quote_response: serde_json::Value) -> Self {
        Self {
            user_public_key,
            quote_response,
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
            prioritization_fee_lamports: None,
        }
    }

    /// Cap the priority fee at `max_lamports` with a "high" priority level.
    /// Zero leaves the fee to Jupiter.
    pub fn with_priority_fee(mut self, max_lamports: u64) -> Self {
        self.prioritization_fee_lamports = (max_lamports > 0).then(|| PrioritizationFee {
            priority_level_with_max_lamports: PriorityLevelWithMaxLamports {
                priority_level: "high".to_string(),
                max_lamports,
            },
        });
        self
    }
}

/// Response from Jupiter swap API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Base64 encoded serialized transaction ready to sign and send
    pub swap_transaction: String,
    #[serde(default)]
    pub last_valid_block_height: Option<u64>,
    #[serde(default)]
    pub prioritization_fee_lamports: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_swap_request_defaults() {
        let req = SwapRequest::new("wallet123".to_string(), json!({ "inAmount": "1" }));
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["userPublicKey"], "wallet123");
        assert_eq!(json["wrapAndUnwrapSol"], true);
        assert_eq!(json["dynamicComputeUnitLimit"], true);
        assert!(json.get("prioritizationFeeLamports").is_none());
    }

    #[test]
    fn test_priority_fee_shape() {
        let req = SwapRequest::new("wallet123".to_string(), json!({})).with_priority_fee(5000);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json["prioritizationFeeLamports"],
            json!({ "priorityLevelWithMaxLamports": { "priorityLevel": "high", "maxLamports": 5000 } })
        );

        let zero = SwapRequest::new("w".to_string(), json!({})).with_priority_fee(0);
        assert!(zero.prioritization_fee_lamports.is_none());
    }

    #[test]
    fn test_swap_response_parsing() {
        let response: SwapResponse = serde_json::from_value(json!({
            "swapTransaction": "AQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=",
            "lastValidBlockHeight": 123456789,
            "prioritizationFeeLamports": 5000
        }))
        .unwrap();
        assert_eq!(response.last_valid_block_height, Some(123456789));
        assert_eq!(response.prioritization_fee_lamports, Some(5000));
    }
}
