//! Raydium Trade API Client
//!
//! Quotes via `/compute/swap-base-in`, builds via
//! `/transaction/swap-base-in`. When the caller leaves the priority fee at 0
//! the suggestion from `/compute/priority-fee` is used, cached per client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::types::{
    ComputeSwap, Envelope, PriorityFeeData, PriorityFeeTiers, SwapTransactionData, SwapTransactionRequest,
};
use crate::config::loader::DEFAULT_RAYDIUM_API_URL;
use crate::domain::priority_fee_cache::PriorityFeeCache;
use crate::domain::units::is_native_mint;
use crate::ports::execution::{SwapError, SwapPort};
use crate::ports::models::{DexProvider, Quote, QuoteRequest, SwapBuild};

#[derive(Debug, Clone)]
pub struct RaydiumConfig {
    pub api_base_url: String,
    /// `V0` or `LEGACY`
    pub tx_version: String,
    pub timeout: Duration,
}

impl Default for RaydiumConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_RAYDIUM_API_URL.to_string(),
            tx_version: "V0".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
pub struct RaydiumClient {
    config: RaydiumConfig,
    http: Client,
    fee_cache: Mutex<PriorityFeeCache>,
}

impl RaydiumClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(RaydiumConfig::default(), PriorityFeeCache::default())
    }

    pub fn with_config(config: RaydiumConfig, fee_cache: PriorityFeeCache) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            http,
            fee_cache: Mutex::new(fee_cache),
        })
    }

    async fn get_envelope<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, String> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let response = self.http.get(&url).query(query).send().await.map_err(|e| e.to_string())?;
        Self::read_envelope(response).await
    }

    async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
        let status = response.status();
        let text = response.text().await.map_err(|e| e.to_string())?;
        match serde_json::from_str::<Envelope<T>>(&text) {
            Ok(envelope) => envelope.into_data(),
            Err(_) if !status.is_success() => Err(format!("API error {}: {}", status, text)),
            Err(e) => Err(format!("Failed to parse response: {}", e)),
        }
    }

    /// Whole compute envelope as JSON, failing on transport or non-JSON bodies
    async fn get_envelope_raw(&self, request: &QuoteRequest) -> Result<serde_json::Value, String> {
        let url = format!("{}/compute/swap-base-in", self.config.api_base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("inputMint", request.input_mint.clone()),
                ("outputMint", request.output_mint.clone()),
                ("amount", request.amount.to_string()),
                ("slippageBps", request.slippage_bps.to_string()),
                ("txVersion", self.config.tx_version.clone()),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let text = response.text().await.map_err(|e| e.to_string())?;
        serde_json::from_str(&text).map_err(|_| format!("API error {}: {}", status, text))
    }

    /// Suggested compute-unit price in micro-lamports.
    ///
    /// Fresh cache hit → no request. Otherwise refresh; a failed refresh
    /// serves the stale value, or the fallback if nothing was ever cached.
    pub async fn get_priority_fee_suggestion(&self) -> u64 {
        let mut cache = self.fee_cache.lock().await;
        if let Some(fee) = cache.fresh() {
            return fee;
        }

        match self.get_envelope::<PriorityFeeData>("/compute/priority-fee", &[]).await {
            Ok(PriorityFeeData { default: PriorityFeeTiers { h: Some(fee), .. } }) => {
                cache.store(fee);
                fee
            }
            Ok(_) => {
                tracing::warn!("Raydium priority fee response had no 'h' tier, using cached or default fee");
                cache.on_refresh_failure()
            }
            Err(e) => {
                tracing::warn!("Raydium priority fee refresh failed ({}), using cached or default fee", e);
                cache.on_refresh_failure()
            }
        }
    }
}

#[async_trait]
impl SwapPort for RaydiumClient {
    fn provider(&self) -> DexProvider {
        DexProvider::Raydium
    }

    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError> {
        tracing::debug!(
            input = %request.input_mint,
            output = %request.output_mint,
            amount = request.amount,
            "Requesting Raydium quote"
        );

        let envelope: serde_json::Value = self
            .get_envelope_raw(request)
            .await
            .map_err(|msg| SwapError::quote(DexProvider::Raydium, request, msg))?;

        let compute: ComputeSwap = serde_json::from_value::<Envelope<ComputeSwap>>(envelope.clone())
            .map_err(|e| e.to_string())
            .and_then(Envelope::into_data)
            .map_err(|msg| SwapError::quote(DexProvider::Raydium, request, msg))?;

        Ok(compute.into_quote(envelope))
    }

    async fn get_swap_transaction(
        &self,
        quote: &Quote,
        payer: &str,
        priority_fee: u64,
    ) -> Result<SwapBuild, SwapError> {
        let fee = if priority_fee == 0 {
            self.get_priority_fee_suggestion().await
        } else {
            priority_fee
        };

        let body = SwapTransactionRequest {
            compute_unit_price_micro_lamports: fee.to_string(),
            swap_response: quote.raw.clone(),
            tx_version: self.config.tx_version.clone(),
            wallet: payer.to_string(),
            wrap_sol: is_native_mint(&quote.input_mint),
            unwrap_sol: is_native_mint(&quote.output_mint),
        };

        let url = format!("{}/transaction/swap-base-in", self.config.api_base_url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SwapError::swap_build(DexProvider::Raydium, e.to_string()))?;

        let transactions: Vec<SwapTransactionData> = Self::read_envelope(response)
            .await
            .map_err(|msg| SwapError::swap_build(DexProvider::Raydium, msg))?;

        let first = transactions
            .into_iter()
            .next()
            .ok_or_else(|| SwapError::swap_build(DexProvider::Raydium, "Response contained no transaction"))?;

        Ok(SwapBuild {
            provider: DexProvider::Raydium,
            transaction_base64: first.transaction,
            last_valid_block_height: None,
            prioritization_fee_lamports: None,
        })
    }
}
