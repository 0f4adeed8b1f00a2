//! Jupiter API Client
//!
//! HTTP client for the Jupiter swap API (v1). Provider failures and transport
//! failures are reported once; nothing here is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::quote::QuoteResponse;
use super::swap::{SwapRequest, SwapResponse};
use crate::config::loader::DEFAULT_JUPITER_API_URL;
use crate::ports::execution::{SwapError, SwapPort};
use crate::ports::models::{DexProvider, Quote, QuoteRequest, SwapBuild};

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    pub api_base_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_JUPITER_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Jupiter DEX aggregator client
#[derive(Debug, Clone)]
pub struct JupiterClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(JupiterConfig::default())
    }

    pub fn with_config(config: JupiterConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    fn with_api_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }

    /// Read the body as JSON and turn `error` fields or non-2xx statuses into a message
    async fn read_body(response: reqwest::Response) -> Result<Value, String> {
        let status = response.status();
        let text = response.text().await.map_err(|e| e.to_string())?;
        let body: Option<Value> = serde_json::from_str(&text).ok();

        if let Some(error) = body.as_ref().and_then(|b| b.get("error")).filter(|e| !e.is_null()) {
            return Err(error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string()));
        }
        if !status.is_success() {
            return Err(format!("API error {}: {}", status, text));
        }
        body.ok_or_else(|| format!("Failed to parse response: {}", text))
    }
}

#[async_trait]
impl SwapPort for JupiterClient {
    fn provider(&self) -> DexProvider {
        DexProvider::Jupiter
    }

    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError> {
        let url = format!("{}/quote", self.config.api_base_url);
        tracing::debug!(
            input = %request.input_mint,
            output = %request.output_mint,
            amount = request.amount,
            "Requesting Jupiter quote"
        );

        let req = self.http.get(&url).query(&[
            ("inputMint", request.input_mint.as_str()),
            ("outputMint", request.output_mint.as_str()),
            ("amount", &request.amount.to_string()),
            ("slippageBps", &request.slippage_bps.to_string()),
        ]);

        let response = self
            .with_api_key(req)
            .send()
            .await
            .map_err(|e| SwapError::quote(DexProvider::Jupiter, request, e.to_string()))?;

        let raw = Self::read_body(response)
            .await
            .map_err(|msg| SwapError::quote(DexProvider::Jupiter, request, msg))?;

        let parsed: QuoteResponse = serde_json::from_value(raw.clone()).map_err(|e| {
            SwapError::quote(DexProvider::Jupiter, request, format!("Unexpected quote shape: {}", e))
        })?;

        Ok(parsed.into_quote(raw))
    }

    async fn get_swap_transaction(
        &self,
        quote: &Quote,
        payer: &str,
        priority_fee: u64,
    ) -> Result<SwapBuild, SwapError> {
        let url = format!("{}/swap", self.config.api_base_url);
        let body = SwapRequest::new(payer.to_string(), quote.raw.clone()).with_priority_fee(priority_fee);

        let response = self
            .with_api_key(self.http.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| SwapError::swap_build(DexProvider::Jupiter, e.to_string()))?;

        let raw = Self::read_body(response)
            .await
            .map_err(|msg| SwapError::swap_build(DexProvider::Jupiter, msg))?;

        let swap: SwapResponse = serde_json::from_value(raw)
            .map_err(|e| SwapError::swap_build(DexProvider::Jupiter, format!("Unexpected swap shape: {}", e)))?;

        Ok(SwapBuild {
            provider: DexProvider::Jupiter,
            transaction_base64: swap.swap_transaction,
            last_valid_block_height: swap.last_valid_block_height,
            prioritization_fee_lamports: swap.prioritization_fee_lamports,
        })
    }
}
